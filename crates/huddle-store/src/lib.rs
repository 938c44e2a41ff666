//! Versioned blob storage for Huddle.
//!
//! A blob store maps string keys to opaque byte sequences. Every blob
//! carries a [`Generation`]; every write names the generation it expects
//! to replace and fails atomically if that expectation no longer holds.
//! This conditional write is the only concurrency primitive the rest of the
//! system relies on: there are no locks or transactions above this layer.
//!
//! # Storage Backends
//!
//! All backends implement the [`BlobStore`] trait:
//!
//! - [`InMemoryBlobStore`] -- `HashMap`-based store for tests and embedding
//! - [`FileBlobStore`] -- one file per key under a root directory
//!
//! # Design Rules
//!
//! 1. Generation 0 means "absent". Reading an absent key is not an error.
//! 2. Writing with generation 0 creates; it fails if the key exists.
//! 3. Writing with generation `g > 0` replaces; it fails unless the current
//!    generation is exactly `g`.
//! 4. A failed write has no effect on stored bytes.
//! 5. Successful writes strictly increase the generation.
//! 6. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod file;
pub mod keys;
pub mod memory;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "contract-tests"))]
pub mod contract;

pub use error::{StoreError, StoreResult};
pub use file::{FileBlobStore, FileStoreConfig};
pub use keys::validate_blob_key;
pub use memory::InMemoryBlobStore;
pub use traits::BlobStore;
pub use types::{Generation, Versioned};
