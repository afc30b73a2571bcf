use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_K;
use crate::short_float::ShortFloat;

/// Two-dimensional degree of belief: frequency and confidence, with an
/// evidential horizon k.
///
/// Frequency is the proportion of positive evidence; confidence is how
/// stable that proportion is under future evidence. Both are stored as
/// fixed-point ShortFloats. Confidence never reaches 1: there is always
/// room for more evidence.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Truth {
    frequency: ShortFloat,
    confidence: ShortFloat,
    k: u32,
}

impl Truth {
    /// Build from frequency and confidence, clamping into range
    /// (confidence strictly below 1).
    pub fn new(frequency: f64, confidence: f64) -> Truth {
        Truth::with_horizon(frequency, confidence, DEFAULT_K)
    }

    pub fn with_horizon(frequency: f64, confidence: f64, k: u32) -> Truth {
        Truth {
            frequency: ShortFloat::clamped(frequency),
            confidence: ShortFloat::clamped(confidence.min(0.9999)),
            k: k.max(1),
        }
    }

    /// Recover (f, c) from evidence weights.
    /// f = w⁺/w (0.5 when w = 0); c = w/(w+k) (0 when w = 0).
    pub fn from_weights(w_plus: f64, w: f64, k: u32) -> Truth {
        let k = k.max(1);
        if w == 0.0 {
            return Truth::with_horizon(0.5, 0.0, k);
        }
        Truth::with_horizon(w_plus / w, w / (w + f64::from(k)), k)
    }

    pub fn frequency(&self) -> f64 {
        self.frequency.value()
    }

    pub fn confidence(&self) -> f64 {
        self.confidence.value()
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    /// E = c·(f − 0.5) + 0.5.
    pub fn expectation(&self) -> f64 {
        self.confidence() * (self.frequency() - 0.5) + 0.5
    }

    /// Positive evidence weight: w⁺ = k·f·c/(1−c).
    pub fn w_plus(&self) -> f64 {
        let c = self.confidence();
        f64::from(self.k) * self.frequency() * c / (1.0 - c)
    }

    /// Negative evidence weight: w⁻ = k·(1−f)·c/(1−c).
    pub fn w_minus(&self) -> f64 {
        let c = self.confidence();
        f64::from(self.k) * (1.0 - self.frequency()) * c / (1.0 - c)
    }

    /// Total evidence weight.
    pub fn w(&self) -> f64 {
        self.w_plus() + self.w_minus()
    }
}

impl std::fmt::Display for Truth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{:.2};{:.2}%", self.frequency(), self.confidence())
    }
}

/// Combine two independent beliefs by evidence-weight addition.
/// The result is always more confident than either input.
pub fn revision(t1: &Truth, t2: &Truth) -> Truth {
    let k = t1.k().max(t2.k());
    let w_plus = t1.w_plus() + t2.w_plus();
    let w = t1.w() + t2.w();
    Truth::from_weights(w_plus, w, k)
}

/// Move a temporal truth to the atemporal layer: frequency unchanged,
/// c ← c/(c+k). Strictly decreases confidence.
pub fn eternalize(t: &Truth) -> Truth {
    let c = t.confidence();
    Truth::with_horizon(t.frequency(), c / (c + f64::from(t.k())), t.k())
}

/// Project a truth from its source time to a target time, discounting
/// confidence by temporal distance. Frequency is unchanged.
pub fn projection(t: &Truth, source_time: i64, current_time: i64, target_time: i64) -> Truth {
    let v = (source_time - target_time).abs() as f64;
    let lo = source_time.min(target_time);
    let hi = source_time.max(target_time);
    let s = if (lo..=hi).contains(&current_time) {
        0.5
    } else {
        let d1 = (source_time - current_time).abs();
        let d2 = (target_time - current_time).abs();
        d1.min(d2) as f64
    };
    let factor = (2.0 * s) / (2.0 * s + v);
    Truth::with_horizon(t.frequency(), t.confidence() * factor, t.k())
}

/// Quality of a truth as a memory item: max(E, (1−E)·0.75).
pub fn truth_to_quality(t: &Truth) -> f64 {
    let e = t.expectation();
    e.max((1.0 - e) * 0.75)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expectation() {
        let t = Truth::new(0.9, 0.9);
        assert!((t.expectation() - 0.86).abs() < 0.001);
        let neutral = Truth::new(0.5, 0.0);
        assert!((neutral.expectation() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_weight_round_trip() {
        for (f, c) in [(0.0, 0.5), (0.9, 0.9), (0.5, 0.1), (1.0, 0.99), (0.3, 0.0)] {
            let t = Truth::new(f, c);
            let back = Truth::from_weights(t.w_plus(), t.w(), t.k());
            assert!(
                (back.frequency() - t.frequency()).abs() < 1e-4,
                "frequency drifted for ({f}, {c}): {}",
                back.frequency()
            );
            assert!(
                (back.confidence() - t.confidence()).abs() < 1e-4,
                "confidence drifted for ({f}, {c}): {}",
                back.confidence()
            );
        }
    }

    #[test]
    fn test_zero_weight_is_neutral() {
        let t = Truth::from_weights(0.0, 0.0, 1);
        assert!((t.frequency() - 0.5).abs() < 1e-9);
        assert_eq!(t.confidence(), 0.0);
    }

    #[test]
    fn test_revision_same_sentence_raises_confidence() {
        let t = Truth::new(0.9, 0.9);
        let r = revision(&t, &t);
        assert!((r.frequency() - 0.9).abs() < 0.001, "frequency preserved");
        assert!(r.confidence() > t.confidence(), "confidence must rise");
    }

    #[test]
    fn test_revision_example_values() {
        // %0.9;0.9% revised with %0.8;0.8% at k=1:
        // w = 9 + 4 = 13, w⁺ = 8.1 + 3.2 = 11.3 → f ≈ 0.87, c = 13/14 ≈ 0.93
        let r = revision(&Truth::new(0.9, 0.9), &Truth::new(0.8, 0.8));
        assert!((r.frequency() - 0.87).abs() < 0.01, "f = {}", r.frequency());
        assert!((r.confidence() - 13.0 / 14.0).abs() < 0.001, "c = {}", r.confidence());
    }

    #[test]
    fn test_eternalize_decreases_confidence() {
        let t = Truth::new(0.9, 0.9);
        let e = eternalize(&t);
        assert!(e.confidence() < t.confidence());
        assert_eq!(e.frequency(), t.frequency());
    }

    #[test]
    fn test_projection_at_source_keeps_confidence_high() {
        let t = Truth::new(0.9, 0.9);
        // Target equals source: v = 0, factor = 1
        let p = projection(&t, 10, 50, 10);
        assert!((p.confidence() - t.confidence()).abs() < 1e-4);
    }

    #[test]
    fn test_projection_discounts_with_distance() {
        let t = Truth::new(0.9, 0.9);
        let near = projection(&t, 10, 0, 12);
        let far = projection(&t, 10, 0, 100);
        assert!(far.confidence() < near.confidence());
        assert_eq!(far.frequency(), t.frequency());
    }

    #[test]
    fn test_projection_current_between_endpoints() {
        let t = Truth::new(0.9, 0.9);
        let p = projection(&t, 0, 5, 10);
        // s = 0.5, v = 10 → factor = 1/11
        assert!((p.confidence() - 0.9 / 11.0).abs() < 1e-3);
    }

    #[test]
    fn test_truth_to_quality_floor() {
        // Low expectation still yields (1-E)*0.75
        let t = Truth::new(0.0, 0.9);
        let e = t.expectation();
        assert!((truth_to_quality(&t) - (1.0 - e) * 0.75).abs() < 1e-9);
        // High expectation yields E itself
        let t2 = Truth::new(1.0, 0.9);
        assert!((truth_to_quality(&t2) - t2.expectation()).abs() < 1e-9);
    }
}
