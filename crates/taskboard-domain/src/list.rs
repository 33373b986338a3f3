use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{board::BoardId, card::CardId};

pub type ListId = Uuid;

/// A list owns an ordered sequence of cards via `cards_order`. `board_id`
/// never changes after creation; cards move between lists, lists do not
/// move between boards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct List {
    pub id: ListId,
    pub board_id: BoardId,
    pub title: String,
    #[serde(default)]
    pub cards_order: Vec<CardId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub destroyed: bool,
}

impl List {
    pub fn new(board_id: BoardId, title: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            board_id,
            title,
            cards_order: Vec::new(),
            created_at: now,
            updated_at: now,
            destroyed: false,
        }
    }
}
