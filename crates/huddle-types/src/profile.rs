//! User profiles.

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;

/// What the assistant remembers about a user.
///
/// `notes` is the mutable field; the assistant rewrites it as it learns
/// preferences over time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Chat-platform user id. Unique.
    pub user_id: String,
    pub display_name: String,
    /// IANA zone name the user prefers for times, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(default)]
    pub notes: String,
    pub created_at: Timestamp,
}
