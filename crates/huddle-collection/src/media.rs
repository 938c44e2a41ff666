//! Uploaded media index.

use std::sync::Arc;

use huddle_store::BlobStore;
use huddle_types::MediaItem;
use uuid::Uuid;

use crate::collection::Collection;
use crate::error::ServiceResult;
use crate::query::ListOptions;

/// Blob key holding every media record.
pub const MEDIA_KEY: &str = "media.jsonl";

/// Create/Get/Update/Remove/List for [`MediaItem`]s.
#[derive(Clone, Debug)]
pub struct MediaService {
    media: Collection<MediaItem>,
}

impl MediaService {
    pub fn new(store: Arc<dyn BlobStore>) -> ServiceResult<Self> {
        Ok(Self {
            media: Collection::new(store, MEDIA_KEY)?,
        })
    }

    /// Index an upload. A blank `media_id` is replaced with a fresh UUID v7.
    pub fn register(&self, mut item: MediaItem) -> ServiceResult<MediaItem> {
        if item.media_id.trim().is_empty() {
            item.media_id = Uuid::now_v7().to_string();
        }
        self.media.create(item)
    }

    pub fn get(&self, media_id: &str) -> ServiceResult<MediaItem> {
        self.media.get(media_id)
    }

    pub fn update_caption(&self, media_id: &str, caption: impl Into<String>) -> ServiceResult<MediaItem> {
        self.media.update(media_id, caption.into())
    }

    pub fn remove(&self, media_id: &str) -> ServiceResult<MediaItem> {
        self.media.remove(media_id)
    }

    /// Media matching `options`; the creator filter matches the uploader.
    pub fn list(&self, options: &ListOptions) -> ServiceResult<Vec<MediaItem>> {
        self.media.list(options)
    }

    /// Every upload in `chat_room_id`, oldest first.
    pub fn list_for_room(&self, chat_room_id: &str) -> ServiceResult<Vec<MediaItem>> {
        let mut items = self.media.list(&ListOptions::all())?;
        items.retain(|m| m.chat_room_id == chat_room_id);
        Ok(items)
    }
}
