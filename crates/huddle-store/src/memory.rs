use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::keys::validate_blob_key;
use crate::traits::BlobStore;
use crate::types::{Generation, Versioned};

#[derive(Clone, Debug)]
struct StoredBlob {
    bytes: Vec<u8>,
    content_type: String,
    generation: Generation,
}

/// In-memory, HashMap-based blob store.
///
/// Intended for tests, REPL sessions and embedding. The check-and-set of a
/// write happens under a single write lock, so the generation precondition
/// is evaluated atomically with the update.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<String, StoredBlob>>,
    writes: AtomicU64,
}

impl InMemoryBlobStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            writes: AtomicU64::new(0),
        }
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|m| m.len()).unwrap_or_default()
    }

    /// Returns `true` if no key has ever been written.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of successful writes since the store was created.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    /// Return a sorted list of all keys in the store.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .blobs
            .read()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn read(&self, key: &str) -> StoreResult<Versioned> {
        validate_blob_key(key)?;
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))?;
        Ok(match blobs.get(key) {
            Some(blob) => Versioned {
                bytes: Some(blob.bytes.clone()),
                content_type: Some(blob.content_type.clone()),
                generation: blob.generation,
            },
            None => Versioned::absent(),
        })
    }

    fn write(
        &self,
        key: &str,
        content_type: &str,
        bytes: &[u8],
        expected: Generation,
    ) -> StoreResult<Generation> {
        validate_blob_key(key)?;
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StoreError::Backend(format!("lock poisoned: {e}")))?;

        let current = blobs
            .get(key)
            .map(|b| b.generation)
            .unwrap_or(Generation::ABSENT);

        if expected.is_absent() && !current.is_absent() {
            return Err(StoreError::AlreadyExists {
                key: key.to_string(),
            });
        }
        if current != expected {
            return Err(StoreError::GenerationMismatch {
                key: key.to_string(),
                expected,
                actual: current,
            });
        }

        let generation = current
            .checked_next()
            .ok_or_else(|| StoreError::generation_exhausted(key))?;
        blobs.insert(
            key.to_string(),
            StoredBlob {
                bytes: bytes.to_vec(),
                content_type: content_type.to_string(),
                generation,
            },
        );
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(key, %generation, len = bytes.len(), "in-memory blob written");
        Ok(generation)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .field("write_count", &self.write_count())
            .finish()
    }
}
