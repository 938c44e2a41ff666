use crate::types::Generation;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A create (expected generation 0) found the key already present.
    #[error("blob already exists: {key}")]
    AlreadyExists { key: String },

    /// The blob's current generation differs from the one the writer expected.
    #[error("generation mismatch for {key}: expected {expected}, found {actual}")]
    GenerationMismatch {
        key: String,
        expected: Generation,
        actual: Generation,
    },

    /// The key cannot be used as a blob address.
    #[error("invalid blob key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// Stored data failed an integrity check or could not be decoded.
    #[error("corrupt blob {key}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Another writer held the key's lock for longer than the configured wait.
    #[error("timed out waiting for write lock on {key}")]
    LockTimeout { key: String },

    /// Backend failure that is not a plain I/O error (poisoned lock, ...).
    #[error("store backend error: {0}")]
    Backend(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Returns `true` if the write was rejected because its generation
    /// precondition did not hold. Such failures never modify the blob.
    pub fn is_precondition_failure(&self) -> bool {
        matches!(
            self,
            StoreError::AlreadyExists { .. } | StoreError::GenerationMismatch { .. }
        )
    }

    /// The stored generation has no successor, so the blob cannot be written.
    pub(crate) fn generation_exhausted(key: &str) -> Self {
        StoreError::Corrupt {
            key: key.to_string(),
            reason: "generation counter exhausted".into(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
