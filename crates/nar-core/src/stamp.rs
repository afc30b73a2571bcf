use serde::{Deserialize, Serialize};

use crate::constants::{DURATION, ETERNAL, MAX_EVIDENTIAL_BASE_LENGTH};

/// One entry in an evidential base: which reasoner produced the evidence
/// (nar-id, randomly sampled per input) and its monotonic input serial.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Evidence {
    pub nar_id: i64,
    pub serial: u64,
}

impl Evidence {
    /// Printable key; evidence entries are compared by this string.
    pub fn key(&self) -> String {
        format!("{}-{}", self.nar_id, self.serial)
    }
}

impl PartialEq for Evidence {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Evidence {}

/// Grammatical tense of an input sentence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tense {
    Past,
    Present,
    Future,
    Eternal,
    None,
}

/// Evidential provenance plus temporal placement of a sentence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Stamp {
    pub evidence: Vec<Evidence>,
    pub creation_time: i64,
    pub occurrence_time: i64,
    pub tense: Tense,
}

impl Stamp {
    /// Stamp for a fresh input at the current logical time.
    /// Tense resolves the occurrence time relative to now; Eternal and
    /// None stay atemporal.
    pub fn input(now: i64, tense: Tense, nar_id: i64, serial: u64) -> Stamp {
        let occurrence_time = match tense {
            Tense::Present => now,
            Tense::Future => now + DURATION,
            Tense::Past => now - DURATION,
            Tense::Eternal | Tense::None => ETERNAL,
        };
        Stamp {
            evidence: vec![Evidence { nar_id, serial }],
            creation_time: now,
            occurrence_time,
            tense,
        }
    }

    pub fn is_eternal(&self) -> bool {
        self.occurrence_time == ETERNAL
    }

    /// Two stamps overlap iff their evidence sets share at least one entry.
    /// Symmetric by construction.
    pub fn overlaps(&self, other: &Stamp) -> bool {
        self.evidence
            .iter()
            .any(|e| other.evidence.iter().any(|o| o.key() == e.key()))
    }

    /// Field-selective equality used by duplicate-evidence detection.
    pub fn equals(
        &self,
        other: &Stamp,
        check_creation: bool,
        check_occurrence: bool,
        check_evidence: bool,
    ) -> bool {
        if check_creation && self.creation_time != other.creation_time {
            return false;
        }
        if check_occurrence && self.occurrence_time != other.occurrence_time {
            return false;
        }
        if check_evidence {
            let mine: Vec<String> = self.evidence.iter().map(Evidence::key).collect();
            let theirs: Vec<String> = other.evidence.iter().map(Evidence::key).collect();
            if mine != theirs {
                return false;
            }
        }
        true
    }
}

/// Temporal interval direction attached to a revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntervalMark {
    /// `&/`, `=/>`, `</>`: conclusion lies one DURATION forward.
    Forward,
    /// `=\>`: conclusion lies one DURATION back.
    Backward,
}

impl IntervalMark {
    pub fn from_symbol(symbol: &str) -> Option<IntervalMark> {
        match symbol {
            "&/" | "=/>" | "</>" => Some(IntervalMark::Forward),
            "=\\>" => Some(IntervalMark::Backward),
            _ => None,
        }
    }
}

/// Merge two stamps for a revised sentence.
///
/// Evidential bases are interleaved (zip then flatten) and truncated to
/// the maximum base length. Creation time is the current clock; the
/// occurrence time is the later of the two (when both are temporal),
/// shifted by the interval mark (negated under reverse order) plus bias.
pub fn revision(
    s1: &Stamp,
    s2: &Stamp,
    now: i64,
    mark: Option<IntervalMark>,
    reverse_order: bool,
    t_bias: i64,
) -> Stamp {
    let mut evidence = Vec::with_capacity(s1.evidence.len() + s2.evidence.len());
    let longest = s1.evidence.len().max(s2.evidence.len());
    for i in 0..longest {
        if let Some(e) = s1.evidence.get(i) {
            evidence.push(*e);
        }
        if let Some(e) = s2.evidence.get(i) {
            evidence.push(*e);
        }
    }
    evidence.truncate(MAX_EVIDENTIAL_BASE_LENGTH);

    let mut occurrence_time = match (s1.is_eternal(), s2.is_eternal()) {
        (true, true) => ETERNAL,
        (true, false) => s2.occurrence_time,
        (false, true) => s1.occurrence_time,
        (false, false) => s1.occurrence_time.max(s2.occurrence_time),
    };

    if occurrence_time != ETERNAL {
        let mut interval = match mark {
            Some(IntervalMark::Forward) => DURATION,
            Some(IntervalMark::Backward) => -DURATION,
            None => 0,
        };
        if reverse_order {
            interval = -interval;
        }
        occurrence_time += interval + t_bias;
    }

    let tense = if occurrence_time == ETERNAL {
        Tense::Eternal
    } else {
        s1.tense
    };

    Stamp {
        evidence,
        creation_time: now,
        occurrence_time,
        tense,
    }
}
