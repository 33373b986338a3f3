use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{list::ListId, user::UserId};

pub type BoardId = Uuid;

/// A board owns an ordered sequence of lists. Display order lives in
/// `lists_order`, never in list timestamps: every id there must reference a
/// live list whose `board_id` points back here, and the array holds no
/// duplicates. Writers maintain this; readers still filter defensively.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    pub owner: UserId,
    #[serde(default)]
    pub members: Vec<UserId>,
    #[serde(default)]
    pub lists_order: Vec<ListId>,
    #[serde(default)]
    pub background: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub destroyed: bool,
}

impl Board {
    pub fn new(title: String, owner: UserId, members: Vec<UserId>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            owner,
            members,
            lists_order: Vec::new(),
            background: None,
            is_completed: false,
            created_at: now,
            updated_at: now,
            destroyed: false,
        }
    }

    pub fn is_owner(&self, user: UserId) -> bool {
        self.owner == user
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.members.contains(&user)
    }

    /// Owner or member: the predicate behind every board-scoped read.
    pub fn has_access(&self, user: UserId) -> bool {
        self.is_owner(user) || self.is_member(user)
    }
}
