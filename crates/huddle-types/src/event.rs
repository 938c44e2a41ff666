//! Scheduled events.
//!
//! An event belongs to exactly one chat room and is identified by that
//! room's id: a room can have at most one event at a time.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// A gathering scheduled from a group chat.
///
/// Only [`description`](Event::description) is mutable after creation.
/// Every other field is written once and preserved verbatim by updates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Chat room (group) identifier. Unique across all events.
    pub chat_room_id: String,
    /// User who created the event.
    pub creator_id: String,
    /// Short human-readable title.
    pub title: String,
    /// When the event begins.
    pub start_time: Timestamp,
    /// When the event ends. Strictly after `start_time`.
    pub end_time: Timestamp,
    /// Participation fee, free-form ("free", "1000 JPY", ...).
    pub fee: String,
    /// Maximum number of participants.
    pub capacity: u32,
    /// Long-form description.
    pub description: String,
    /// Whether the creator's name is shown to participants.
    pub show_creator: bool,
}

impl Event {
    /// Returns `true` if `user_id` created this event.
    ///
    /// Callers use this between a `get` and an `update` to decide whether
    /// the acting user may change the event.
    pub fn is_created_by(&self, user_id: &str) -> bool {
        self.creator_id == user_id
    }

    /// Length of the event.
    pub fn duration(&self) -> chrono::Duration {
        self.end_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::parse_timestamp;

    fn sample() -> Event {
        Event {
            chat_room_id: "C100".into(),
            creator_id: "U1".into(),
            title: "Board games".into(),
            start_time: parse_timestamp("2026-11-02T19:00:00+09:00").unwrap(),
            end_time: parse_timestamp("2026-11-02T22:00:00+09:00").unwrap(),
            fee: "free".into(),
            capacity: 12,
            description: "Bring snacks".into(),
            show_creator: true,
        }
    }

    #[test]
    fn ownership_check() {
        let event = sample();
        assert!(event.is_created_by("U1"));
        assert!(!event.is_created_by("U2"));
    }

    #[test]
    fn duration_is_end_minus_start() {
        assert_eq!(sample().duration(), chrono::Duration::hours(3));
    }

    #[test]
    fn json_keeps_field_order_and_offset() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.starts_with("{\"chat_room_id\":\"C100\",\"creator_id\":\"U1\""));
        assert!(json.contains("\"start_time\":\"2026-11-02T19:00:00+09:00\""));
        let back: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sample());
    }
}
