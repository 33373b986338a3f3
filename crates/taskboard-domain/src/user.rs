use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::view::UserSummary;

pub type UserId = Uuid;

/// Users are read-only inside the engine: membership and assignee
/// projections consume them, nothing here mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub full_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
}

impl User {
    pub fn new(username: String, email: String, full_name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            full_name,
            avatar: None,
            is_admin: false,
        }
    }

    /// The projection exposed in board views: id, username, avatar only.
    pub fn summary(&self) -> UserSummary {
        UserSummary {
            id: self.id,
            username: self.username.clone(),
            avatar: self.avatar.clone(),
        }
    }
}
