//! Nested read-side view types.
//!
//! Assembled in application memory by the board view assembler: cards carry
//! their resolved assignee, lists carry their cards, the board carries its
//! lists, and all user references collapse to the id/username/avatar
//! projection.

use serde::{Deserialize, Serialize};

use crate::{board::Board, card::Card, list::List, user::UserId};

/// The only shape in which users leave the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardView {
    pub card: Card,
    pub assignee: Option<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListView {
    pub list: List,
    pub cards: Vec<CardView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardView {
    pub board: Board,
    pub owner: Option<UserSummary>,
    pub members: Vec<UserSummary>,
    pub lists: Vec<ListView>,
}
