//! Simulated group membership for local harnesses.

use std::sync::Arc;

use huddle_store::BlobStore;
use huddle_types::{Clock, GroupMember, MemberRole, SystemClock};

use crate::collection::Collection;
use crate::error::{ServiceError, ServiceResult};
use crate::query::ListOptions;
use crate::record::require_key_part;

/// Blob key holding every simulated membership.
pub const GROUPSIM_KEY: &str = "groupsim.jsonl";

/// Join/leave/rename bookkeeping for simulated chat rooms.
#[derive(Clone)]
pub struct GroupSimService {
    members: Collection<GroupMember>,
    clock: Arc<dyn Clock>,
}

impl GroupSimService {
    pub fn new(store: Arc<dyn BlobStore>) -> ServiceResult<Self> {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<dyn BlobStore>, clock: Arc<dyn Clock>) -> ServiceResult<Self> {
        Ok(Self {
            members: Collection::new(store, GROUPSIM_KEY)?,
            clock,
        })
    }

    /// Add `user_id` to `chat_room_id`. Joining twice is a conflict.
    pub fn join(
        &self,
        chat_room_id: &str,
        user_id: &str,
        nickname: &str,
        role: MemberRole,
    ) -> ServiceResult<GroupMember> {
        self.members.create(GroupMember {
            chat_room_id: chat_room_id.to_string(),
            user_id: user_id.to_string(),
            nickname: nickname.to_string(),
            role,
            joined_at: self.clock.now(),
        })
    }

    pub fn member(&self, chat_room_id: &str, user_id: &str) -> ServiceResult<GroupMember> {
        self.members.get(&membership_key(chat_room_id, user_id)?)
    }

    /// Change the nickname `user_id` goes by in `chat_room_id`.
    pub fn rename(
        &self,
        chat_room_id: &str,
        user_id: &str,
        nickname: impl Into<String>,
    ) -> ServiceResult<GroupMember> {
        self.members
            .update(&membership_key(chat_room_id, user_id)?, nickname.into())
    }

    pub fn leave(&self, chat_room_id: &str, user_id: &str) -> ServiceResult<GroupMember> {
        self.members.remove(&membership_key(chat_room_id, user_id)?)
    }

    /// Members of `chat_room_id` in join order.
    pub fn members(&self, chat_room_id: &str) -> ServiceResult<Vec<GroupMember>> {
        let mut members = self.members.list(&ListOptions::all())?;
        members.retain(|m| m.chat_room_id == chat_room_id);
        Ok(members)
    }

    /// Every room `user_id` belongs to, in join order.
    pub fn rooms_of(&self, user_id: &str) -> ServiceResult<Vec<String>> {
        let memberships = self.members.list(&ListOptions::all().created_by(user_id))?;
        Ok(memberships.into_iter().map(|m| m.chat_room_id).collect())
    }
}

fn membership_key(chat_room_id: &str, user_id: &str) -> ServiceResult<String> {
    require_key_part(chat_room_id, "chat_room_id")
        .map_err(|reason| ServiceError::validation(chat_room_id, reason))?;
    require_key_part(user_id, "user_id")
        .map_err(|reason| ServiceError::validation(user_id, reason))?;
    Ok(GroupMember::membership_key(chat_room_id, user_id))
}

impl std::fmt::Debug for GroupSimService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupSimService")
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}
