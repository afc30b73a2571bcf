/// Number of priority levels a bag stratifies its items into.
pub const TOTAL_LEVEL: usize = 100;

/// Levels below this yield a single item per distributor visit.
pub const BAG_THRESHOLD: usize = 10;

/// Minimum priority movement for forgetting to apply.
pub const RELATIVE_THRESHOLD: f64 = 0.1;

/// Fraction of quality preserved as the forgetting floor.
pub const QUALITY_FLOOR: f64 = 0.3;

/// Concept bag capacity.
pub const CONCEPT_BAG_SIZE: usize = 10000;

/// Per-concept task-link bag capacity.
pub const TASK_LINK_BAG_SIZE: usize = 100;

/// Per-concept term-link bag capacity.
pub const TERM_LINK_BAG_SIZE: usize = 100;

/// Forgetting rate (cycles-to-half) for the concept bag.
pub const CONCEPT_FORGET_CYCLES: f64 = 10.0;

/// Forgetting rate for task-link bags.
pub const TASK_LINK_FORGET_CYCLES: f64 = 20.0;

/// Forgetting rate for term-link bags.
pub const TERM_LINK_FORGET_CYCLES: f64 = 50.0;

/// Global task bag capacity (input and novel task bags).
pub const TASK_BAG_SIZE: usize = 1000;

/// Forgetting rate for the global task bags.
pub const TASK_FORGET_CYCLES: f64 = 1.0;

/// Maximum beliefs retained per concept.
pub const CONCEPT_BELIEFS_MAX: usize = 28;

/// Maximum questions retained per concept (FIFO shift on overflow).
pub const CONCEPT_QUESTIONS_MAX: usize = 5;

/// Maximum goals retained per concept (FIFO shift on overflow).
pub const CONCEPT_GOALS_MAX: usize = 7;

/// Evidential base entries are truncated beyond this length.
pub const MAX_EVIDENTIAL_BASE_LENGTH: usize = 20000;

/// Occurrence-time sentinel marking an atemporal sentence.
pub const ETERNAL: i64 = i32::MIN as i64;

/// Logical duration of one tense step, in cycles.
pub const DURATION: i64 = 5;

/// Novelty horizon: minimum cycle gap before a (task-link, term-link)
/// pair may be reconsidered.
pub const NOVELTY_HORIZON: i64 = 100000;

/// Entries kept in a task-link's recency record.
pub const TERM_LINK_RECORD_LENGTH: usize = 10;

/// Beliefs must differ by at most this many cycles of occurrence time
/// to be eligible for revision.
pub const REVISION_MAX_OCCURRENCE_DISTANCE: i64 = 10;

/// Truth values closer than this are treated as equal.
pub const TRUTH_EPSILON: f64 = 0.01;

/// Budget summaries below this are not worth remembering.
pub const BUDGET_THRESHOLD: f64 = 0.01;

/// Complexity scale factor in solution quality.
pub const COMPLEXITY_UNIT: f64 = 1.0;

/// Default evidential horizon k.
pub const DEFAULT_K: u32 = 1;

pub const DEFAULT_JUDGMENT_FREQUENCY: f64 = 1.0;
pub const DEFAULT_JUDGMENT_CONFIDENCE: f64 = 0.9;
pub const DEFAULT_JUDGMENT_PRIORITY: f64 = 0.8;
pub const DEFAULT_JUDGMENT_DURABILITY: f64 = 0.5;
pub const DEFAULT_QUESTION_PRIORITY: f64 = 0.9;
pub const DEFAULT_QUESTION_DURABILITY: f64 = 0.9;
pub const DEFAULT_GOAL_PRIORITY: f64 = 0.9;
pub const DEFAULT_GOAL_DURABILITY: f64 = 0.9;
