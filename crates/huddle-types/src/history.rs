//! Conversation history.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Timestamp;
use crate::error::TypeError;

/// Who produced a history entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A human participant of the chat room.
    User,
    /// The assistant itself.
    Assistant,
    /// Out-of-band notes injected by the host (joins, reminders).
    System,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
            Role::System => write!(f, "system"),
        }
    }
}

impl FromStr for Role {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            "system" => Ok(Role::System),
            other => Err(TypeError::UnknownRole(other.to_string())),
        }
    }
}

/// One message in a chat room's conversation history.
///
/// `content` is the only mutable field (message edits).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique entry id (UUID v7, so ids sort by creation time).
    pub id: String,
    /// Chat room the message was posted in.
    pub chat_room_id: String,
    /// Author of the message (a user id, or the assistant's own id).
    pub author_id: String,
    pub role: Role,
    pub content: String,
    pub created_at: Timestamp,
}

impl HistoryEntry {
    /// Build a new entry with a freshly generated id.
    pub fn new(
        chat_room_id: impl Into<String>,
        author_id: impl Into<String>,
        role: Role,
        content: impl Into<String>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            chat_room_id: chat_room_id.into(),
            author_id: author_id.into(),
            role,
            content: content.into(),
            created_at,
        }
    }
}
