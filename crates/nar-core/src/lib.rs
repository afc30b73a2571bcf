//! Non-axiomatic reasoning core.
//!
//! A memory-bounded, priority-driven inference engine: Narsese sentences
//! become tasks, tasks conceptualize into a forgetting concept bag,
//! beliefs revise under evidence tracking, and questions unify against
//! remembered beliefs, all inside a fixed attention budget.
//!
//! Zero I/O: pure data structures and a synchronous control loop with
//! no opinions about transport or persistence.

pub mod bag;
pub mod budget;
pub mod clock;
pub mod concept;
pub mod constants;
pub mod distributor;
pub mod engine;
pub mod error;
pub mod link;
pub mod memory;
pub mod parser;
pub mod reasoner;
pub mod rules;
pub mod sentence;
pub mod short_float;
pub mod stamp;
pub mod task;
pub mod term;
pub mod truth;

pub use bag::{Bag, BagItem};
pub use budget::Budget;
pub use clock::Clock;
pub use concept::Concept;
pub use distributor::Distributor;
pub use engine::{DerivationEngine, Explanation, Pattern, Rule};
pub use error::{NarError, Result};
pub use link::{LinkType, TaskLink, TermLink};
pub use memory::{BagEntry, ConceptSummary, InputOutcome, Memory};
pub use parser::parse_task;
pub use reasoner::{CycleReport, InputReport, Reasoner};
pub use rules::{RuleTable, DEFAULT_RULES};
pub use sentence::{solution_quality, Punctuation, Sentence};
pub use short_float::{average, prob_and, prob_or, ShortFloat};
pub use stamp::{Evidence, IntervalMark, Stamp, Tense};
pub use task::{Task, TaskType};
pub use term::{Connector, Copula, Term, TermKind, VarKind};
pub use truth::Truth;
