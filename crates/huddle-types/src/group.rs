//! Simulated group membership.
//!
//! Local harnesses have no chat platform to ask "who is in this room", so
//! membership is kept as ordinary records.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// Membership level inside a simulated group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Admin,
    #[default]
    Member,
}

impl fmt::Display for MemberRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberRole::Admin => write!(f, "admin"),
            MemberRole::Member => write!(f, "member"),
        }
    }
}

/// A user's membership in one chat room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMember {
    pub chat_room_id: String,
    pub user_id: String,
    /// Name shown inside this group. The only mutable field.
    pub nickname: String,
    #[serde(default)]
    pub role: MemberRole,
    pub joined_at: Timestamp,
}

impl GroupMember {
    /// Composite key identifying the membership: `<room>/<user>`.
    pub fn membership_key(chat_room_id: &str, user_id: &str) -> String {
        format!("{chat_room_id}/{user_id}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn membership_key_format() {
        assert_eq!(GroupMember::membership_key("C1", "U9"), "C1/U9");
    }

    #[test]
    fn role_defaults_to_member() {
        assert_eq!(MemberRole::default(), MemberRole::Member);
        assert_eq!(MemberRole::Admin.to_string(), "admin");
    }
}
