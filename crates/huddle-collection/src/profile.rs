//! User profile service.

use std::sync::Arc;

use huddle_store::BlobStore;
use huddle_types::{Clock, SystemClock, UserProfile};

use crate::collection::Collection;
use crate::error::ServiceResult;
use crate::query::ListOptions;

/// Blob key holding every profile.
pub const PROFILES_KEY: &str = "profiles.jsonl";

/// Create/Get/Update/Remove/List for [`UserProfile`]s, keyed by user id.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Collection<UserProfile>,
    clock: Arc<dyn Clock>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn BlobStore>) -> ServiceResult<Self> {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> ServiceResult<Self> {
        Ok(Self {
            profiles: Collection::new(store, PROFILES_KEY)?,
            clock,
        })
    }

    /// Register a profile for `user_id` with empty notes.
    pub fn create(
        &self,
        user_id: &str,
        display_name: &str,
        timezone: Option<String>,
    ) -> ServiceResult<UserProfile> {
        self.profiles.create(UserProfile {
            user_id: user_id.to_string(),
            display_name: display_name.to_string(),
            timezone,
            notes: String::new(),
            created_at: self.clock.now(),
        })
    }

    pub fn get(&self, user_id: &str) -> ServiceResult<UserProfile> {
        self.profiles.get(user_id)
    }

    /// Overwrite the notes kept for `user_id`.
    pub fn update_notes(&self, user_id: &str, notes: impl Into<String>) -> ServiceResult<UserProfile> {
        self.profiles.update(user_id, notes.into())
    }

    pub fn remove(&self, user_id: &str) -> ServiceResult<UserProfile> {
        self.profiles.remove(user_id)
    }

    /// Profiles matching `options`; the time bounds apply to `created_at`.
    pub fn list(&self, options: &ListOptions) -> ServiceResult<Vec<UserProfile>> {
        self.profiles.list(options)
    }
}

impl std::fmt::Debug for ProfileService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileService")
            .field("profiles", &self.profiles)
            .finish_non_exhaustive()
    }
}
