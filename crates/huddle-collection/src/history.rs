//! Conversation history, one collection per chat room.

use std::sync::Arc;

use huddle_store::BlobStore;
use huddle_types::{Clock, HistoryEntry, Role, SystemClock};

use crate::collection::Collection;
use crate::error::{ServiceError, ServiceResult};
use crate::query::ListOptions;

/// Blob key of a chat room's history.
pub fn history_key(chat_room_id: &str) -> String {
    format!("history/{chat_room_id}.jsonl")
}

/// Append-mostly message log per chat room.
#[derive(Clone)]
pub struct HistoryService {
    store: Arc<dyn BlobStore>,
    clock: Arc<dyn Clock>,
}

impl HistoryService {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    fn room(&self, chat_room_id: &str) -> ServiceResult<Collection<HistoryEntry>> {
        if chat_room_id.trim().is_empty() {
            return Err(ServiceError::validation(
                chat_room_id,
                "chat_room_id must not be blank",
            ));
        }
        Collection::new(Arc::clone(&self.store), history_key(chat_room_id)).map_err(|e| match e {
            ServiceError::Validation { reason, .. } => ServiceError::validation(chat_room_id, reason),
            other => other,
        })
    }

    /// Record a new message in `chat_room_id`, stamped with the current time.
    pub fn append(
        &self,
        chat_room_id: &str,
        author_id: &str,
        role: Role,
        content: impl Into<String>,
    ) -> ServiceResult<HistoryEntry> {
        let entry = HistoryEntry::new(chat_room_id, author_id, role, content, self.clock.now());
        self.room(chat_room_id)?.create(entry)
    }

    pub fn get(&self, chat_room_id: &str, id: &str) -> ServiceResult<HistoryEntry> {
        self.room(chat_room_id)?.get(id)
    }

    /// Replace the content of an existing message.
    pub fn edit(
        &self,
        chat_room_id: &str,
        id: &str,
        content: impl Into<String>,
    ) -> ServiceResult<HistoryEntry> {
        self.room(chat_room_id)?.update(id, content.into())
    }

    pub fn remove(&self, chat_room_id: &str, id: &str) -> ServiceResult<HistoryEntry> {
        self.room(chat_room_id)?.remove(id)
    }

    pub fn list(&self, chat_room_id: &str, options: &ListOptions) -> ServiceResult<Vec<HistoryEntry>> {
        self.room(chat_room_id)?.list(options)
    }

    /// The newest `n` messages of `chat_room_id`, oldest first.
    ///
    /// This is the window handed to the language model as context. Entries
    /// stamped ahead of the local clock are still included.
    pub fn recent(&self, chat_room_id: &str, n: usize) -> ServiceResult<Vec<HistoryEntry>> {
        let mut entries = self.list(chat_room_id, &ListOptions::all())?;
        let skip = entries.len().saturating_sub(n);
        Ok(entries.split_off(skip))
    }

    /// Forget every message of `chat_room_id`. Returns how many were removed.
    pub fn clear(&self, chat_room_id: &str) -> ServiceResult<usize> {
        self.room(chat_room_id)?.remove_where(|_| true)
    }
}

impl std::fmt::Debug for HistoryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistoryService").finish_non_exhaustive()
    }
}
