use serde::{Deserialize, Serialize};

use crate::stamp::{Stamp, Tense};
use crate::term::{Copula, Term, VarKind};
use crate::truth::Truth;

/// Sentence kind, by surface punctuation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Punctuation {
    Judgment,
    Question,
    Goal,
}

impl Punctuation {
    pub fn symbol(self) -> char {
        match self {
            Punctuation::Judgment => '.',
            Punctuation::Question => '?',
            Punctuation::Goal => '!',
        }
    }

    pub fn from_symbol(c: char) -> Option<Punctuation> {
        match c {
            '.' => Some(Punctuation::Judgment),
            '?' => Some(Punctuation::Question),
            '!' => Some(Punctuation::Goal),
            _ => None,
        }
    }
}

/// A term under a punctuation, with truth (judgments and goals) and
/// evidential stamp.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Sentence {
    pub term: Term,
    pub punctuation: Punctuation,
    pub truth: Option<Truth>,
    pub stamp: Stamp,
}

impl Sentence {
    pub fn judgment(term: Term, truth: Truth, stamp: Stamp) -> Sentence {
        Sentence {
            term,
            punctuation: Punctuation::Judgment,
            truth: Some(truth),
            stamp,
        }
    }

    pub fn question(term: Term, stamp: Stamp) -> Sentence {
        Sentence {
            term,
            punctuation: Punctuation::Question,
            truth: None,
            stamp,
        }
    }

    pub fn goal(term: Term, truth: Truth, stamp: Stamp) -> Sentence {
        Sentence {
            term,
            punctuation: Punctuation::Goal,
            truth: Some(truth),
            stamp,
        }
    }

    pub fn is_judgment(&self) -> bool {
        self.punctuation == Punctuation::Judgment
    }

    pub fn is_question(&self) -> bool {
        self.punctuation == Punctuation::Question
    }

    pub fn is_goal(&self) -> bool {
        self.punctuation == Punctuation::Goal
    }

    /// Printable form plus punctuation; the key tasks are filed under.
    pub fn key(&self) -> String {
        format!("{}{}", self.term.name(), self.punctuation.symbol())
    }

    /// Whether this judgment may be merged with another by revision:
    /// inheritance and equivalence statements always, anything else only
    /// when free of dependent variables.
    pub fn is_revisable(&self) -> bool {
        matches!(
            self.term.copula(),
            Some(Copula::Inheritance) | Some(Copula::Equivalence)
        ) || !self.term.contains_variable(VarKind::Dependent)
    }

    /// Full Narsese rendering, including tense and truth where present.
    pub fn to_narsese(&self) -> String {
        let mut out = format!("{}{}", self.term.name(), self.punctuation.symbol());
        match self.stamp.tense {
            Tense::Future => out.push_str(" :/:"),
            Tense::Present => out.push_str(" :|:"),
            Tense::Past => out.push_str(" :\\:"),
            Tense::Eternal | Tense::None => {}
        }
        if let Some(truth) = &self.truth {
            out.push(' ');
            out.push_str(&truth.to_string());
        }
        out
    }
}

impl std::fmt::Display for Sentence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_narsese())
    }
}

/// How well `solution` answers `problem`.
///
/// Zero when the solution has no truth, or when punctuations differ and
/// the solution still carries a query variable. Otherwise rated either by
/// raw confidence (belief selection) or by expectation discounted by the
/// eighth root of term complexity (answer ranking, favouring simpler
/// answers).
pub fn solution_quality(problem: &Sentence, solution: &Sentence, rate_by_confidence: bool) -> f64 {
    let Some(truth) = &solution.truth else {
        return 0.0;
    };
    if problem.punctuation != solution.punctuation
        && solution.term.contains_variable(VarKind::Query)
    {
        return 0.0;
    }
    if rate_by_confidence {
        truth.confidence()
    } else {
        truth.expectation()
            / (f64::from(solution.term.complexity()) * crate::constants::COMPLEXITY_UNIT)
                .powf(1.0 / 8.0)
    }
}
