//! Error types for collection services.

use std::fmt;

use huddle_store::StoreError;
use thiserror::Error;

/// Why a mutation was rejected as a conflict.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictReason {
    /// A record with the same unique key already exists.
    Duplicate,
    /// The collection changed between this call's read and its write.
    StaleGeneration,
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::Duplicate => write!(f, "already exists"),
            ConflictReason::StaleGeneration => write!(f, "was modified concurrently"),
        }
    }
}

/// Errors returned by collection services.
///
/// Every variant names the key it concerns. Services never recover from
/// these locally; the caller decides whether to retry.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The caller supplied an unusable record or argument.
    #[error("invalid {key}: {reason}")]
    Validation { key: String, reason: String },

    /// Uniqueness violation or lost optimistic-concurrency race.
    #[error("{key} {reason}")]
    Conflict { key: String, reason: ConflictReason },

    /// The target record does not exist.
    #[error("{key} not found")]
    NotFound { key: String },

    /// The backing store failed, or its contents could not be decoded.
    #[error("storage failure for {key}: {source}")]
    Store {
        key: String,
        #[source]
        source: StoreError,
    },
}

impl ServiceError {
    pub(crate) fn validation(key: impl Into<String>, reason: impl Into<String>) -> Self {
        ServiceError::Validation {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(key: impl Into<String>) -> Self {
        ServiceError::NotFound { key: key.into() }
    }

    /// The key this error concerns.
    pub fn key(&self) -> &str {
        match self {
            ServiceError::Validation { key, .. }
            | ServiceError::Conflict { key, .. }
            | ServiceError::NotFound { key }
            | ServiceError::Store { key, .. } => key,
        }
    }

    /// Returns `true` if re-reading and trying again may succeed.
    ///
    /// Only conflicts qualify. Store failures are never retried here: their
    /// effect on the blob is unknown.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ServiceError::Conflict { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, ServiceError::Conflict { .. })
    }

    /// Short failure text suitable for handing back to the conversational
    /// layer in place of a tool result.
    pub fn user_message(&self) -> String {
        match self {
            ServiceError::Validation { key, reason } => {
                format!("Sorry, that request for {key} is not valid: {reason}.")
            }
            ServiceError::Conflict {
                key,
                reason: ConflictReason::Duplicate,
            } => format!("Sorry, {key} already exists."),
            ServiceError::Conflict {
                key,
                reason: ConflictReason::StaleGeneration,
            } => format!("Sorry, {key} was changed by someone else at the same time. Please try again."),
            ServiceError::NotFound { key } => format!("Sorry, I could not find {key}."),
            ServiceError::Store { .. } => {
                "Sorry, something went wrong while saving. Please try again later.".to_string()
            }
        }
    }
}

/// Result alias for collection service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_message_names_key() {
        let err = ServiceError::Conflict {
            key: "g1".into(),
            reason: ConflictReason::Duplicate,
        };
        assert_eq!(err.to_string(), "g1 already exists");
        assert!(err.is_retryable());
        assert_eq!(err.key(), "g1");
    }

    #[test]
    fn only_conflicts_are_retryable() {
        let not_found = ServiceError::not_found("g1");
        let invalid = ServiceError::validation("g1", "blank title");
        let store = ServiceError::Store {
            key: "events.jsonl".into(),
            source: StoreError::Backend("down".into()),
        };
        assert!(!not_found.is_retryable());
        assert!(!invalid.is_retryable());
        assert!(!store.is_retryable());
    }

    #[test]
    fn user_messages_do_not_leak_store_details() {
        let store = ServiceError::Store {
            key: "events.jsonl".into(),
            source: StoreError::Backend("disk quota exceeded on /var/x".into()),
        };
        let msg = store.user_message();
        assert!(!msg.contains("/var/x"));

        let stale = ServiceError::Conflict {
            key: "g7".into(),
            reason: ConflictReason::StaleGeneration,
        };
        assert!(stale.user_message().contains("try again"));
        assert!(ServiceError::not_found("g2").user_message().contains("g2"));
    }

    #[test]
    fn store_error_is_source() {
        use std::error::Error as _;
        let err = ServiceError::Store {
            key: "k".into(),
            source: StoreError::LockTimeout { key: "k".into() },
        };
        assert!(err.source().is_some());
    }
}
