//! The [`Record`] trait tying domain types to the generic collection.

use serde::de::DeserializeOwned;
use serde::Serialize;

use huddle_types::{Event, GroupMember, HistoryEntry, MediaItem, Timestamp, UserProfile};

/// A domain type that can live in a [`Collection`](crate::Collection).
///
/// Each record has a unique key, an owner (for "created by" filtering), a
/// primary timestamp (for range filtering and ordering), and exactly one
/// field that may change after creation.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Human-readable name of the record kind, used in log lines.
    const KIND: &'static str;

    /// New value for the record's single mutable field.
    type Patch;

    /// The unique key within the collection.
    fn key(&self) -> String;

    /// The user who owns or created the record.
    fn owner(&self) -> &str;

    /// The timestamp that range filters and ordering apply to.
    fn timestamp(&self) -> Timestamp;

    /// Replace the mutable field, leaving every other field untouched.
    fn apply(&mut self, patch: Self::Patch);

    /// Record-level invariants checked on create. Returns the reason on failure.
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

fn require(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{field} must not be blank"))
    } else {
        Ok(())
    }
}

/// Rejects values that would make a `<room>/<user>` membership key ambiguous.
pub(crate) fn require_key_part(value: &str, field: &str) -> Result<(), String> {
    require(value, field)?;
    if value.contains('/') {
        return Err(format!("{field} must not contain '/'"));
    }
    Ok(())
}

impl Record for Event {
    const KIND: &'static str = "event";
    type Patch = String;

    fn key(&self) -> String {
        self.chat_room_id.clone()
    }

    fn owner(&self) -> &str {
        &self.creator_id
    }

    fn timestamp(&self) -> Timestamp {
        self.start_time
    }

    fn apply(&mut self, description: String) {
        self.description = description;
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.creator_id, "creator_id")?;
        require(&self.title, "title")?;
        if self.capacity == 0 {
            return Err("capacity must be positive".into());
        }
        if self.start_time >= self.end_time {
            return Err("start_time must be before end_time".into());
        }
        Ok(())
    }
}

impl Record for HistoryEntry {
    const KIND: &'static str = "history entry";
    type Patch = String;

    fn key(&self) -> String {
        self.id.clone()
    }

    fn owner(&self) -> &str {
        &self.author_id
    }

    fn timestamp(&self) -> Timestamp {
        self.created_at
    }

    fn apply(&mut self, content: String) {
        self.content = content;
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.chat_room_id, "chat_room_id")?;
        require(&self.author_id, "author_id")
    }
}

impl Record for UserProfile {
    const KIND: &'static str = "profile";
    type Patch = String;

    fn key(&self) -> String {
        self.user_id.clone()
    }

    fn owner(&self) -> &str {
        &self.user_id
    }

    fn timestamp(&self) -> Timestamp {
        self.created_at
    }

    fn apply(&mut self, notes: String) {
        self.notes = notes;
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.display_name, "display_name")
    }
}

impl Record for MediaItem {
    const KIND: &'static str = "media";
    type Patch = String;

    fn key(&self) -> String {
        self.media_id.clone()
    }

    fn owner(&self) -> &str {
        &self.uploader_id
    }

    fn timestamp(&self) -> Timestamp {
        self.uploaded_at
    }

    fn apply(&mut self, caption: String) {
        self.caption = caption;
    }

    fn validate(&self) -> Result<(), String> {
        require(&self.chat_room_id, "chat_room_id")?;
        require(&self.uploader_id, "uploader_id")?;
        require(&self.file_name, "file_name")?;
        require(&self.storage_ref, "storage_ref")?;
        if !self.content_type.contains('/') {
            return Err(format!("content_type {:?} is not a MIME type", self.content_type));
        }
        Ok(())
    }
}

impl Record for GroupMember {
    const KIND: &'static str = "group member";
    type Patch = String;

    fn key(&self) -> String {
        GroupMember::membership_key(&self.chat_room_id, &self.user_id)
    }

    fn owner(&self) -> &str {
        &self.user_id
    }

    fn timestamp(&self) -> Timestamp {
        self.joined_at
    }

    fn apply(&mut self, nickname: String) {
        self.nickname = nickname;
    }

    fn validate(&self) -> Result<(), String> {
        require_key_part(&self.chat_room_id, "chat_room_id")?;
        require_key_part(&self.user_id, "user_id")?;
        require(&self.nickname, "nickname")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use huddle_types::parse_timestamp;

    fn event() -> Event {
        Event {
            chat_room_id: "g1".into(),
            creator_id: "u1".into(),
            title: "Picnic".into(),
            start_time: parse_timestamp("2026-11-01T10:00:00+09:00").unwrap(),
            end_time: parse_timestamp("2026-11-01T12:00:00+09:00").unwrap(),
            fee: "free".into(),
            capacity: 50,
            description: "d1".into(),
            show_creator: false,
        }
    }

    #[test]
    fn event_key_owner_timestamp() {
        let e = event();
        assert_eq!(e.key(), "g1");
        assert_eq!(e.owner(), "u1");
        assert_eq!(e.timestamp(), e.start_time);
    }

    #[test]
    fn event_apply_only_touches_description() {
        let mut e = event();
        let before = e.clone();
        e.apply("d2".into());
        assert_eq!(e.description, "d2");
        assert_eq!(
            Event {
                description: before.description.clone(),
                ..e
            },
            before
        );
    }

    #[test]
    fn event_validation() {
        assert!(event().validate().is_ok());

        let mut zero = event();
        zero.capacity = 0;
        assert!(zero.validate().unwrap_err().contains("capacity"));

        let mut backwards = event();
        backwards.end_time = backwards.start_time;
        assert!(backwards.validate().unwrap_err().contains("before"));

        let mut untitled = event();
        untitled.title = "   ".into();
        assert!(untitled.validate().unwrap_err().contains("title"));
    }

    #[test]
    fn group_member_key_is_composite() {
        let m = GroupMember {
            chat_room_id: "C1".into(),
            user_id: "U1".into(),
            nickname: "Ann".into(),
            role: Default::default(),
            joined_at: parse_timestamp("2026-01-01T00:00:00Z").unwrap(),
        };
        assert_eq!(m.key(), "C1/U1");
        assert!(m.validate().is_ok());

        let ambiguous = GroupMember {
            chat_room_id: "C1/U1".into(),
            user_id: "x".into(),
            ..m.clone()
        };
        assert!(ambiguous.validate().unwrap_err().contains("chat_room_id"));
        let ambiguous = GroupMember {
            user_id: "U1/x".into(),
            ..m
        };
        assert!(ambiguous.validate().unwrap_err().contains("user_id"));
    }
}
