//! Collection services for Huddle.
//!
//! Each collection of domain records is persisted as a single blob of
//! line-delimited JSON in a [`huddle_store::BlobStore`]. Services load the
//! whole collection, apply one operation, and write it back conditioned on
//! the generation they read. A concurrent writer that got there first turns
//! the write into a [`ServiceError::Conflict`]; nothing is retried or cached.
//!
//! # Modules
//!
//! - [`codec`]: line-delimited JSON framing for a whole collection
//! - [`collection`]: the generic [`Collection`] read-modify-write service
//! - [`query`]: [`ListOptions`] filtering, ordering and row caps
//! - [`record`]: the [`Record`] trait implemented by every domain type
//! - [`event`], [`history`], [`profile`], [`media`], [`group`]: the five
//!   domain services built on [`Collection`]

pub mod codec;
pub mod collection;
pub mod error;
pub mod event;
pub mod group;
pub mod history;
pub mod media;
pub mod profile;
pub mod query;
pub mod record;

pub use codec::CodecError;
pub use collection::Collection;
pub use error::{ConflictReason, ServiceError, ServiceResult};
pub use event::{EventService, EVENTS_KEY};
pub use group::{GroupSimService, GROUPSIM_KEY};
pub use history::{history_key, HistoryService};
pub use media::{MediaService, MEDIA_KEY};
pub use profile::{ProfileService, PROFILES_KEY};
pub use query::{ListOptions, SortDirection};
pub use record::Record;
