//! Event scheduling service.
//!
//! One event per chat room. Events are created with a start time in the
//! future, may later have their description changed, and are hard-deleted
//! when cancelled.
//!
//! Ownership is not checked here. A caller that only lets the creator edit
//! an event does so explicitly:
//!
//! ```no_run
//! # use huddle_collection::{EventService, ServiceResult};
//! # fn edit(events: &EventService, room: &str, user: &str, text: &str) -> ServiceResult<()> {
//! let event = events.get(room)?;
//! if event.is_created_by(user) {
//!     events.update_description(room, text)?;
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use huddle_store::BlobStore;
use huddle_types::{Clock, Event, SystemClock};
use tracing::debug;

use crate::collection::Collection;
use crate::error::{ServiceError, ServiceResult};
use crate::query::ListOptions;

/// Blob key holding every event.
pub const EVENTS_KEY: &str = "events.jsonl";

/// Create/Get/Update/Remove/List for [`Event`]s.
#[derive(Clone)]
pub struct EventService {
    events: Collection<Event>,
    clock: Arc<dyn Clock>,
}

impl EventService {
    /// Event service on `store` using the system clock.
    pub fn new(store: Arc<dyn BlobStore>) -> ServiceResult<Self> {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    /// Event service on `store` judging "the future" by `clock`.
    pub fn with_clock(store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> ServiceResult<Self> {
        Ok(Self {
            events: Collection::new(store, EVENTS_KEY)?,
            clock,
        })
    }

    /// Create `event`.
    ///
    /// Fails with [`ServiceError::Validation`] if the chat room id, creator
    /// or title is blank, the capacity is zero, the start is not before the
    /// end, or the start is not strictly in the future. Fails with
    /// [`ServiceError::Conflict`] if the room already has an event.
    pub fn create(&self, event: Event) -> ServiceResult<Event> {
        let now = self.clock.now();
        if event.start_time <= now {
            return Err(ServiceError::validation(
                &event.chat_room_id,
                format!(
                    "start_time {} is not in the future",
                    event.start_time.to_rfc3339()
                ),
            ));
        }
        self.events.create(event)
    }

    /// The event scheduled in `chat_room_id`.
    pub fn get(&self, chat_room_id: &str) -> ServiceResult<Event> {
        self.events.get(chat_room_id)
    }

    /// Replace the description of the event in `chat_room_id`.
    ///
    /// Times are not re-validated: an event that has already started can
    /// still have its description edited.
    pub fn update_description(
        &self,
        chat_room_id: &str,
        description: impl Into<String>,
    ) -> ServiceResult<Event> {
        self.events.update(chat_room_id, description.into())
    }

    /// Delete the event in `chat_room_id`.
    pub fn remove(&self, chat_room_id: &str) -> ServiceResult<Event> {
        self.events.remove(chat_room_id)
    }

    /// Events matching `options`.
    pub fn list(&self, options: &ListOptions) -> ServiceResult<Vec<Event>> {
        let events = self.events.list(options)?;
        debug!(count = events.len(), ?options, "events listed");
        Ok(events)
    }

    /// Events starting at or after now, soonest first, at most `limit`.
    pub fn upcoming(&self, limit: usize) -> ServiceResult<Vec<Event>> {
        self.list(&ListOptions::all().since(self.clock.now()).limit(limit))
    }
}

impl std::fmt::Debug for EventService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventService")
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}
