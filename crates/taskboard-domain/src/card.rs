use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{board::BoardId, list::ListId, user::UserId};

pub type CardId = Uuid;

/// A card belongs to exactly one list at a time. `list_id` is mutable but
/// only through the move coordinator, which rewrites both affected
/// `cards_order` arrays in the same logical operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub board_id: BoardId,
    pub list_id: ListId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub assignee: Option<UserId>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub cover: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub ended_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub destroyed: bool,
}

impl Card {
    pub fn new(board_id: BoardId, list_id: ListId, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board_id,
            list_id,
            title,
            description: String::new(),
            assignee: None,
            is_completed: false,
            cover: None,
            created_at: now,
            ended_at: None,
            updated_at: now,
            destroyed: false,
        }
    }
}
