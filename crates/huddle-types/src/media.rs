//! Uploaded media metadata.
//!
//! The bytes of an upload live elsewhere (object storage); this record is
//! the index entry that lets the assistant find and describe it.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// An image or file uploaded into a chat room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    /// Unique media id.
    pub media_id: String,
    pub chat_room_id: String,
    /// User who uploaded the file.
    pub uploader_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    /// Location of the bytes in the media bucket.
    pub storage_ref: String,
    /// Human or assistant supplied caption. The only mutable field.
    #[serde(default)]
    pub caption: String,
    pub uploaded_at: Timestamp,
}

impl MediaItem {
    /// Returns `true` for `image/*` content types.
    pub fn is_image(&self) -> bool {
        self.content_type.starts_with("image/")
    }
}
