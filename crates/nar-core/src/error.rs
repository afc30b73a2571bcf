use std::fmt;

/// Recoverable failures surfaced to the host as values.
///
/// Bag overflow is not an error: `Bag::put_in` returns the displaced item.
/// Guard and unification rejections inside the derivation engine are not
/// errors either, the conclusion is simply not produced.
#[derive(Debug)]
pub enum NarError {
    /// Malformed Narsese input. Never corrupts memory state.
    Parse(String),
    /// Empty input rejected at the channel boundary.
    EmptyInput,
    /// A ShortFloat was constructed from a value outside [0, 1].
    ValueOutOfRange(f64),
    /// A rule-table line that is neither a comment nor a valid rule.
    RuleTable(String),
}

impl fmt::Display for NarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarError::Parse(msg) => write!(f, "parse error: {msg}"),
            NarError::EmptyInput => write!(f, "empty input"),
            NarError::ValueOutOfRange(v) => write!(f, "value out of [0, 1] range: {v}"),
            NarError::RuleTable(msg) => write!(f, "rule table error: {msg}"),
        }
    }
}

impl std::error::Error for NarError {}

pub type Result<T> = std::result::Result<T, NarError>;
