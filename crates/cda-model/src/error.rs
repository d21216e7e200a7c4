use thiserror::Error;

/// Errors raised while parsing an HL7 timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    /// The value is present but does not follow
    /// `YYYY[MM[DD[HH[MM[SS[.F+]]]]]][+-ZZZZ]`.
    #[error("malformed timestamp '{value}': {reason}")]
    Malformed { value: String, reason: String },
}

impl TimestampError {
    pub fn malformed(value: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// The literal input that failed to parse.
    pub fn value(&self) -> &str {
        match self {
            Self::Malformed { value, .. } => value,
        }
    }
}

pub type Result<T> = std::result::Result<T, TimestampError>;

/// A serialized timestamp whose components disagree with its precision or
/// fall out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp: {reason}")]
pub struct InvalidTimestamp {
    reason: String,
}

impl InvalidTimestamp {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
