//! Generic read-modify-write service over one collection blob.
//!
//! Every operation performs exactly one read of the blob and at most one
//! conditional write naming the generation that read returned. Nothing is
//! cached between calls and nothing is retried: a lost race surfaces as a
//! [`ServiceError::Conflict`] for the caller to handle.

use std::marker::PhantomData;
use std::sync::Arc;

use huddle_store::{validate_blob_key, BlobStore, Generation, StoreError};
use tracing::{debug, info, warn};

use crate::codec::{self, CONTENT_TYPE};
use crate::error::{ConflictReason, ServiceError, ServiceResult};
use crate::query::ListOptions;
use crate::record::Record;

/// A decoded collection together with the generation it was read at.
struct Snapshot<R> {
    records: Vec<R>,
    generation: Generation,
}

impl<R: Record> Snapshot<R> {
    fn position(&self, key: &str) -> Option<usize> {
        self.records.iter().position(|r| r.key() == key)
    }
}

/// Create/Get/Update/Remove/List over the records stored in one blob.
///
/// The service is stateless; any number of `Collection` values over the
/// same store and blob key are interchangeable.
pub struct Collection<R> {
    store: Arc<dyn BlobStore>,
    blob_key: String,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            blob_key: self.blob_key.clone(),
            _record: PhantomData,
        }
    }
}

impl<R> std::fmt::Debug for Collection<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collection")
            .field("blob_key", &self.blob_key)
            .finish_non_exhaustive()
    }
}

impl<R: Record> Collection<R> {
    /// Bind a collection to `blob_key` in `store`.
    ///
    /// Fails with [`ServiceError::Validation`] if the key is not a valid
    /// blob key.
    pub fn new(store: Arc<dyn BlobStore>, blob_key: impl Into<String>) -> ServiceResult<Self> {
        let blob_key = blob_key.into();
        validate_blob_key(&blob_key).map_err(|e| match e {
            StoreError::InvalidKey { key, reason } => ServiceError::Validation { key, reason },
            other => ServiceError::Store {
                key: blob_key.clone(),
                source: other,
            },
        })?;
        Ok(Self {
            store,
            blob_key,
            _record: PhantomData,
        })
    }

    /// The blob key this collection is stored under.
    pub fn blob_key(&self) -> &str {
        &self.blob_key
    }

    fn store_error(&self, source: StoreError) -> ServiceError {
        ServiceError::Store {
            key: self.blob_key.clone(),
            source,
        }
    }

    fn load(&self) -> ServiceResult<Snapshot<R>> {
        let read = self
            .store
            .read(&self.blob_key)
            .map_err(|e| self.store_error(e))?;
        let records = codec::decode(read.bytes_or_empty()).map_err(|e| {
            warn!(blob = %self.blob_key, error = %e, "undecodable collection");
            self.store_error(StoreError::Corrupt {
                key: self.blob_key.clone(),
                reason: e.to_string(),
            })
        })?;
        debug!(
            blob = %self.blob_key,
            generation = %read.generation,
            count = records.len(),
            "collection loaded"
        );
        Ok(Snapshot {
            records,
            generation: read.generation,
        })
    }

    fn commit(&self, records: &[R], expected: Generation, record_key: &str) -> ServiceResult<Generation> {
        let bytes = codec::encode(records)
            .map_err(|e| self.store_error(StoreError::Backend(e.to_string())))?;
        match self
            .store
            .write(&self.blob_key, CONTENT_TYPE, &bytes, expected)
        {
            Ok(generation) => Ok(generation),
            Err(e) if e.is_precondition_failure() => {
                warn!(
                    blob = %self.blob_key,
                    key = record_key,
                    expected = %expected,
                    "collection changed underneath write"
                );
                Err(ServiceError::Conflict {
                    key: record_key.to_string(),
                    reason: ConflictReason::StaleGeneration,
                })
            }
            Err(e) => Err(self.store_error(e)),
        }
    }

    fn require_key(key: &str) -> ServiceResult<()> {
        if key.trim().is_empty() {
            return Err(ServiceError::validation(
                R::KIND,
                "key must not be blank",
            ));
        }
        Ok(())
    }

    /// Append `record`, rejecting blank or duplicate keys.
    pub fn create(&self, record: R) -> ServiceResult<R> {
        let key = record.key();
        Self::require_key(&key)?;
        record
            .validate()
            .map_err(|reason| ServiceError::validation(&key, reason))?;

        let mut snapshot = self.load()?;
        if snapshot.position(&key).is_some() {
            return Err(ServiceError::Conflict {
                key,
                reason: ConflictReason::Duplicate,
            });
        }
        snapshot.records.push(record.clone());
        let generation = self.commit(&snapshot.records, snapshot.generation, &key)?;
        info!(kind = R::KIND, key = %key, %generation, "record created");
        Ok(record)
    }

    /// Fetch the record stored under `key`.
    pub fn get(&self, key: &str) -> ServiceResult<R> {
        Self::require_key(key)?;
        let snapshot = self.load()?;
        snapshot
            .records
            .into_iter()
            .find(|r| r.key() == key)
            .ok_or_else(|| ServiceError::not_found(key))
    }

    /// Replace the mutable field of the record under `key`.
    ///
    /// Every other field is preserved. A missing key fails without writing.
    pub fn update(&self, key: &str, patch: R::Patch) -> ServiceResult<R> {
        Self::require_key(key)?;
        let mut snapshot = self.load()?;
        let idx = snapshot
            .position(key)
            .ok_or_else(|| ServiceError::not_found(key))?;
        snapshot.records[idx].apply(patch);
        let updated = snapshot.records[idx].clone();
        let generation = self.commit(&snapshot.records, snapshot.generation, key)?;
        info!(kind = R::KIND, key, %generation, "record updated");
        Ok(updated)
    }

    /// Physically delete the record under `key` and return it.
    pub fn remove(&self, key: &str) -> ServiceResult<R> {
        Self::require_key(key)?;
        let mut snapshot = self.load()?;
        let idx = snapshot
            .position(key)
            .ok_or_else(|| ServiceError::not_found(key))?;
        let removed = snapshot.records.remove(idx);
        let generation = self.commit(&snapshot.records, snapshot.generation, key)?;
        info!(kind = R::KIND, key, %generation, remaining = snapshot.records.len(), "record removed");
        Ok(removed)
    }

    /// Records matching `options`, ordered and capped per [`ListOptions`].
    pub fn list(&self, options: &ListOptions) -> ServiceResult<Vec<R>> {
        let snapshot = self.load()?;
        Ok(options.apply(snapshot.records))
    }

    /// Every record in stored (insertion) order.
    pub fn all(&self) -> ServiceResult<Vec<R>> {
        Ok(self.load()?.records)
    }

    /// Remove every record matching `predicate` in one write.
    ///
    /// Returns how many were removed. Nothing is written when nothing matches.
    pub fn remove_where<F>(&self, predicate: F) -> ServiceResult<usize>
    where
        F: Fn(&R) -> bool,
    {
        let mut snapshot = self.load()?;
        let before = snapshot.records.len();
        snapshot.records.retain(|r| !predicate(r));
        let removed = before - snapshot.records.len();
        if removed == 0 {
            return Ok(0);
        }
        let generation = self.commit(&snapshot.records, snapshot.generation, &self.blob_key)?;
        info!(kind = R::KIND, blob = %self.blob_key, removed, %generation, "records removed");
        Ok(removed)
    }
}
