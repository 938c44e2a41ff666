use crate::error::StoreResult;
use crate::types::{Generation, Versioned};

/// Key-addressed byte store with generation-conditioned writes.
///
/// All implementations must satisfy these invariants:
/// - Reading an absent key returns `Ok` with [`Generation::ABSENT`] and no
///   bytes. Absence is never reported as an error.
/// - `write` with `expected == ABSENT` creates the key and fails with
///   [`StoreError::AlreadyExists`](crate::StoreError::AlreadyExists) if it exists.
/// - `write` with `expected > ABSENT` replaces the blob only if its current
///   generation equals `expected`; otherwise it fails with
///   [`StoreError::GenerationMismatch`](crate::StoreError::GenerationMismatch).
/// - A failed write leaves the stored bytes untouched.
/// - The generation returned by a successful write is strictly greater than
///   the one it replaced.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlobStore: Send + Sync {
    /// Read the current bytes and generation stored under `key`.
    fn read(&self, key: &str) -> StoreResult<Versioned>;

    /// Conditionally write `bytes` under `key`.
    ///
    /// Returns the new generation on success.
    fn write(
        &self,
        key: &str,
        content_type: &str,
        bytes: &[u8],
        expected: Generation,
    ) -> StoreResult<Generation>;

    /// Current generation of `key` without returning its bytes.
    ///
    /// Default implementation performs a full read. Backends may override.
    fn generation(&self, key: &str) -> StoreResult<Generation> {
        Ok(self.read(key)?.generation)
    }
}
