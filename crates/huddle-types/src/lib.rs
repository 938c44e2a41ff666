//! Domain records for Huddle, a group-chat assistant.
//!
//! Every collection the assistant keeps is a flat list of one of these
//! record types. The types here carry no storage logic; persistence and
//! invariants such as key uniqueness live in `huddle-collection`.
//!
//! # Key Types
//!
//! - [`Event`]: a scheduled gathering, at most one per chat room
//! - [`HistoryEntry`]: one message of a chat room's conversation history
//! - [`UserProfile`]: per-user profile and free-form notes
//! - [`MediaItem`]: metadata for an uploaded image or file
//! - [`GroupMember`]: simulated group membership used by local harnesses
//! - [`Clock`]: injectable source of "now" for time-based validation

pub mod clock;
pub mod error;
pub mod event;
pub mod group;
pub mod history;
pub mod media;
pub mod profile;

pub use clock::{parse_timestamp, Clock, FixedClock, SystemClock, Timestamp};
pub use error::TypeError;
pub use event::Event;
pub use group::{GroupMember, MemberRole};
pub use history::{HistoryEntry, Role};
pub use media::MediaItem;
pub use profile::UserProfile;
