use serde::{Deserialize, Serialize};

use crate::constants::{QUALITY_FLOOR, RELATIVE_THRESHOLD};
use crate::short_float::{average, prob_and, prob_or, ShortFloat};
use crate::truth::{truth_to_quality, Truth};

/// Attention triple: priority (current importance), durability (decay
/// resistance), quality (long-term value).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub priority: ShortFloat,
    pub durability: ShortFloat,
    pub quality: ShortFloat,
}

impl Budget {
    /// Build from raw values, clamping each into [0, 1].
    pub fn new(priority: f64, durability: f64, quality: f64) -> Budget {
        Budget {
            priority: ShortFloat::clamped(priority),
            durability: ShortFloat::clamped(durability),
            quality: ShortFloat::clamped(quality),
        }
    }

    pub fn priority(&self) -> f64 {
        self.priority.value()
    }

    pub fn durability(&self) -> f64 {
        self.durability.value()
    }

    pub fn quality(&self) -> f64 {
        self.quality.value()
    }

    /// Summary s = d·(p+q)/2.
    pub fn summary(&self) -> f64 {
        self.durability() * (self.priority() + self.quality()) / 2.0
    }

    /// Worth processing at all: mean(p, d, q) > 0.001.
    pub fn above_threshold(&self) -> bool {
        average(&[self.priority(), self.durability(), self.quality()]) > 0.001
    }

    /// Bag merge rule applied when a key is re-inserted: the incoming
    /// priority wins, durability and quality keep their maxima.
    pub fn merge(&mut self, displaced: &Budget) {
        self.durability = self.durability.max(displaced.durability);
        self.quality = self.quality.max(displaced.quality);
    }
}

impl std::fmt::Display for Budget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "${:.2};{:.2};{:.2}$",
            self.priority(),
            self.durability(),
            self.quality()
        )
    }
}

/// Decay a budget's priority toward its quality floor.
///
/// With decay rate C (cycles-to-half) and floor q* = quality·0.3:
/// when priority sits within the relative threshold of the floor nothing
/// moves; otherwise p ← q* + (p − q*)·d^(1/(C·|p − q*|)).
pub fn forget(budget: &mut Budget, forget_rate: f64) {
    let floor = budget.quality() * QUALITY_FLOOR;
    let p = budget.priority();
    let distance = (p - floor).abs();
    if distance < RELATIVE_THRESHOLD {
        return;
    }
    let decayed = floor + (p - floor) * budget.durability().powf(1.0 / (forget_rate * distance));
    budget.priority.set(decayed);
}

/// Activate a concept budget with an incoming task budget:
/// priority sums probabilistically, durability averages, quality keeps.
pub fn activate(concept: &mut Budget, incoming: &Budget) {
    concept.priority.set(prob_or(concept.priority(), incoming.priority()));
    concept
        .durability
        .set(average(&[concept.durability(), incoming.durability()]));
}

/// Budget feedback for a revision.
///
/// The task (and optionally its links) pay for how far the revised truth
/// moved away from what they already claimed; the derived budget is
/// rewarded by the confidence gained over both parents.
pub fn revise(
    task_budget: &mut Budget,
    t_task: &Truth,
    t_belief: Option<&Truth>,
    t_derived: &Truth,
    mut task_link: Option<&mut Budget>,
    mut term_link: Option<&mut Budget>,
) -> Budget {
    let d_task = (t_task.expectation() - t_derived.expectation()).abs();

    task_budget
        .priority
        .set(prob_and(task_budget.priority(), 1.0 - d_task));
    task_budget
        .durability
        .set(prob_and(task_budget.durability(), 1.0 - d_task));

    if let Some(link) = task_link.as_deref_mut() {
        link.priority.set(prob_and(task_budget.priority(), d_task));
        link.durability.set(prob_and(task_budget.durability(), d_task));
    }

    if let (Some(link), Some(belief)) = (term_link.as_deref_mut(), t_belief) {
        let d_belief = (belief.expectation() - t_derived.expectation()).abs();
        link.priority.set(prob_and(link.priority(), 1.0 - d_belief));
        link.durability.set(prob_and(link.durability(), 1.0 - d_belief));
    }

    let parent_confidence = t_belief
        .map(|b| b.confidence().max(t_task.confidence()))
        .unwrap_or_else(|| t_task.confidence());
    let gain = (t_derived.confidence() - parent_confidence).clamp(0.0, 1.0);

    Budget::new(
        prob_or(gain, task_budget.priority()),
        average(&[gain, task_budget.durability()]),
        truth_to_quality(t_derived),
    )
}
