use thiserror::Error;

/// Errors produced while building or parsing domain values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp { input: String, reason: String },

    #[error("unknown role: {0}")]
    UnknownRole(String),
}
