//! Entity store boundary.
//!
//! Four collections, each behind its own trait so managers receive exactly
//! the stores they need and tests substitute them freely. The primitives
//! mirror what a document database offers: filtered find with sort/limit,
//! insert, atomic update-on-match for a single document, and bulk update.
//! Atomicity stops at the document edge; nothing here spans collections.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use taskboard_core::TaskboardResult;
use taskboard_domain::{
    Board, BoardId, Card, CardId, FieldUpdate, List, ListId, User, UserId,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    CreatedAtAsc,
    CreatedAtDesc,
    UpdatedAtAsc,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FindOptions {
    pub sort: SortOrder,
    pub limit: Option<usize>,
}

impl FindOptions {
    pub fn sorted(sort: SortOrder) -> Self {
        Self { sort, limit: None }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Board query filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct BoardFilter {
    pub id: Option<BoardId>,
    pub owner: Option<UserId>,
    pub member: Option<UserId>,
    /// Owner-or-member, the access predicate behind dashboard reads.
    pub accessible_to: Option<UserId>,
    pub destroyed: Option<bool>,
    pub is_completed: Option<bool>,
    /// Case-insensitive substring match on the title.
    pub title_contains: Option<String>,
}

impl BoardFilter {
    pub fn by_id(id: BoardId) -> Self {
        Self {
            id: Some(id),
            ..Default::default()
        }
    }

    /// Match a live (non-destroyed) board by id.
    pub fn live(id: BoardId) -> Self {
        Self {
            id: Some(id),
            destroyed: Some(false),
            ..Default::default()
        }
    }

    pub fn matches(&self, board: &Board) -> bool {
        if self.id.is_some_and(|id| board.id != id) {
            return false;
        }
        if self.owner.is_some_and(|u| board.owner != u) {
            return false;
        }
        if self.member.is_some_and(|u| !board.is_member(u)) {
            return false;
        }
        if self.accessible_to.is_some_and(|u| !board.has_access(u)) {
            return false;
        }
        if self.destroyed.is_some_and(|d| board.destroyed != d) {
            return false;
        }
        if self.is_completed.is_some_and(|c| board.is_completed != c) {
            return false;
        }
        if let Some(ref needle) = self.title_contains {
            if !contains_ignore_case(&board.title, needle) {
                return false;
            }
        }
        true
    }
}

/// Atomic board update. All set/push/pull fields of one patch apply under a
/// single document write, and every application stamps `updated_at`.
#[derive(Debug, Clone, Default)]
pub struct BoardPatch {
    pub title: Option<String>,
    pub background: FieldUpdate<String>,
    pub is_completed: Option<bool>,
    /// Wholesale replacement of the order array (client-side reorder).
    pub lists_order: Option<Vec<ListId>>,
    pub push_lists_order: Option<ListId>,
    pub pull_lists_order: Option<ListId>,
    pub push_member: Option<UserId>,
    pub pull_member: Option<UserId>,
    pub destroyed: Option<bool>,
}

impl BoardPatch {
    pub fn apply(self, board: &mut Board, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            board.title = title;
        }
        self.background.apply_to(&mut board.background);
        if let Some(done) = self.is_completed {
            board.is_completed = done;
        }
        if let Some(order) = self.lists_order {
            board.lists_order = order;
        }
        if let Some(list_id) = self.push_lists_order {
            board.lists_order.push(list_id);
        }
        if let Some(list_id) = self.pull_lists_order {
            board.lists_order.retain(|id| *id != list_id);
        }
        if let Some(user_id) = self.push_member {
            board.members.push(user_id);
        }
        if let Some(user_id) = self.pull_member {
            board.members.retain(|id| *id != user_id);
        }
        if let Some(destroyed) = self.destroyed {
            board.destroyed = destroyed;
        }
        board.updated_at = now;
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub id: Option<ListId>,
    pub board_id: Option<BoardId>,
    pub destroyed: Option<bool>,
}

impl ListFilter {
    pub fn live(id: ListId) -> Self {
        Self {
            id: Some(id),
            destroyed: Some(false),
            ..Default::default()
        }
    }

    /// Live lists of one board, the cascade/read-side scan.
    pub fn live_in_board(board_id: BoardId) -> Self {
        Self {
            board_id: Some(board_id),
            destroyed: Some(false),
            ..Default::default()
        }
    }

    pub fn matches(&self, list: &List) -> bool {
        if self.id.is_some_and(|id| list.id != id) {
            return false;
        }
        if self.board_id.is_some_and(|id| list.board_id != id) {
            return false;
        }
        if self.destroyed.is_some_and(|d| list.destroyed != d) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListPatch {
    pub title: Option<String>,
    /// Wholesale replacement (move coordinator snapshots).
    pub cards_order: Option<Vec<CardId>>,
    /// Prepend: new cards surface at the head of the list.
    pub push_cards_order_front: Option<CardId>,
    pub pull_cards_order: Option<CardId>,
    pub destroyed: Option<bool>,
}

impl ListPatch {
    pub fn apply(self, list: &mut List, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            list.title = title;
        }
        if let Some(order) = self.cards_order {
            list.cards_order = order;
        }
        if let Some(card_id) = self.push_cards_order_front {
            list.cards_order.insert(0, card_id);
        }
        if let Some(card_id) = self.pull_cards_order {
            list.cards_order.retain(|id| *id != card_id);
        }
        if let Some(destroyed) = self.destroyed {
            list.destroyed = destroyed;
        }
        list.updated_at = now;
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardFilter {
    pub id: Option<CardId>,
    pub board_id: Option<BoardId>,
    pub list_id: Option<ListId>,
    pub assignee: Option<UserId>,
    pub destroyed: Option<bool>,
    pub is_completed: Option<bool>,
    pub title_contains: Option<String>,
}

impl CardFilter {
    pub fn live(id: CardId) -> Self {
        Self {
            id: Some(id),
            destroyed: Some(false),
            ..Default::default()
        }
    }

    pub fn live_in_board(board_id: BoardId) -> Self {
        Self {
            board_id: Some(board_id),
            destroyed: Some(false),
            ..Default::default()
        }
    }

    pub fn live_in_list(list_id: ListId) -> Self {
        Self {
            list_id: Some(list_id),
            destroyed: Some(false),
            ..Default::default()
        }
    }

    pub fn matches(&self, card: &Card) -> bool {
        if self.id.is_some_and(|id| card.id != id) {
            return false;
        }
        if self.board_id.is_some_and(|id| card.board_id != id) {
            return false;
        }
        if self.list_id.is_some_and(|id| card.list_id != id) {
            return false;
        }
        if self.assignee.is_some_and(|u| card.assignee != Some(u)) {
            return false;
        }
        if self.destroyed.is_some_and(|d| card.destroyed != d) {
            return false;
        }
        if self.is_completed.is_some_and(|c| card.is_completed != c) {
            return false;
        }
        if let Some(ref needle) = self.title_contains {
            if !contains_ignore_case(&card.title, needle) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct CardPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: FieldUpdate<UserId>,
    pub is_completed: Option<bool>,
    pub cover: FieldUpdate<String>,
    pub ended_at: FieldUpdate<DateTime<Utc>>,
    /// Only the move coordinator sets this; a bare field update changing the
    /// parent would desynchronize both lists' order arrays.
    pub list_id: Option<ListId>,
    pub destroyed: Option<bool>,
}

impl CardPatch {
    pub fn apply(self, card: &mut Card, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            card.title = title;
        }
        if let Some(description) = self.description {
            card.description = description;
        }
        self.assignee.apply_to(&mut card.assignee);
        if let Some(done) = self.is_completed {
            card.is_completed = done;
        }
        self.cover.apply_to(&mut card.cover);
        self.ended_at.apply_to(&mut card.ended_at);
        if let Some(list_id) = self.list_id {
            card.list_id = list_id;
        }
        if let Some(destroyed) = self.destroyed {
            card.destroyed = destroyed;
        }
        card.updated_at = now;
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = needle.trim();
    if needle.is_empty() {
        return true;
    }
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
pub trait BoardStore: Send + Sync {
    async fn insert_one(&self, board: Board) -> TaskboardResult<Board>;
    async fn find_one(&self, id: BoardId) -> TaskboardResult<Option<Board>>;
    async fn find(&self, filter: BoardFilter, options: FindOptions) -> TaskboardResult<Vec<Board>>;
    /// Atomic read-modify-write on the first matching document.
    /// Returns the updated document, or `None` when nothing matched.
    async fn find_one_and_update(
        &self,
        filter: BoardFilter,
        patch: BoardPatch,
    ) -> TaskboardResult<Option<Board>>;
}

#[async_trait]
pub trait ListStore: Send + Sync {
    async fn insert_one(&self, list: List) -> TaskboardResult<List>;
    async fn find_one(&self, id: ListId) -> TaskboardResult<Option<List>>;
    async fn find(&self, filter: ListFilter, options: FindOptions) -> TaskboardResult<Vec<List>>;
    async fn find_one_and_update(
        &self,
        filter: ListFilter,
        patch: ListPatch,
    ) -> TaskboardResult<Option<List>>;
    /// Bulk update; returns the number of documents modified.
    async fn update_many(&self, filter: ListFilter, patch: ListPatch) -> TaskboardResult<u64>;
}

#[async_trait]
pub trait CardStore: Send + Sync {
    async fn insert_one(&self, card: Card) -> TaskboardResult<Card>;
    async fn find_one(&self, id: CardId) -> TaskboardResult<Option<Card>>;
    async fn find(&self, filter: CardFilter, options: FindOptions) -> TaskboardResult<Vec<Card>>;
    async fn find_one_and_update(
        &self,
        filter: CardFilter,
        patch: CardPatch,
    ) -> TaskboardResult<Option<Card>>;
    async fn update_many(&self, filter: CardFilter, patch: CardPatch) -> TaskboardResult<u64>;
}

/// Users are consumed read-only; insert exists for seeding and tests.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_one(&self, user: User) -> TaskboardResult<User>;
    async fn find_one(&self, id: UserId) -> TaskboardResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> TaskboardResult<Option<User>>;
    async fn find_by_ids(&self, ids: &[UserId]) -> TaskboardResult<Vec<User>>;
}
