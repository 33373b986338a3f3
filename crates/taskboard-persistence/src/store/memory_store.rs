//! In-process document store.
//!
//! One `RwLock` per collection; every mutation holds the write guard for the
//! whole read-modify-write, which gives exactly the per-document
//! update-on-match atomicity the engine assumes. Nothing coordinates across
//! collections, so multi-document operations in the service layer see the
//! same partial-failure surface they would against a real document database.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use taskboard_core::{ConflictReason, TaskboardError, TaskboardResult};
use taskboard_domain::{Board, BoardId, Card, CardId, List, ListId, User, UserId};

use crate::traits::{
    BoardFilter, BoardPatch, BoardStore, CardFilter, CardPatch, CardStore, FindOptions,
    ListFilter, ListPatch, ListStore, SortOrder, UserStore,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    boards: RwLock<HashMap<BoardId, Board>>,
    lists: RwLock<HashMap<ListId, List>>,
    cards: RwLock<HashMap<CardId, Card>>,
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn sort_and_limit<T>(
    mut docs: Vec<T>,
    options: FindOptions,
    key: impl Fn(&T) -> (chrono::DateTime<Utc>, Uuid),
    updated: impl Fn(&T) -> chrono::DateTime<Utc>,
) -> Vec<T> {
    match options.sort {
        SortOrder::CreatedAtAsc => docs.sort_by_key(|d| key(d)),
        SortOrder::CreatedAtDesc => {
            docs.sort_by_key(|d| key(d));
            docs.reverse();
        }
        SortOrder::UpdatedAtAsc => docs.sort_by_key(|d| (updated(d), key(d).1)),
    }
    if let Some(limit) = options.limit {
        docs.truncate(limit);
    }
    docs
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn insert_one(&self, board: Board) -> TaskboardResult<Board> {
        let mut guard = self.boards.write().await;
        if guard.contains_key(&board.id) {
            return Err(TaskboardError::Internal(format!(
                "duplicate board id {}",
                board.id
            )));
        }
        tracing::debug!(board_id = %board.id, "insert board");
        guard.insert(board.id, board.clone());
        Ok(board)
    }

    async fn find_one(&self, id: BoardId) -> TaskboardResult<Option<Board>> {
        Ok(self.boards.read().await.get(&id).cloned())
    }

    async fn find(&self, filter: BoardFilter, options: FindOptions) -> TaskboardResult<Vec<Board>> {
        let guard = self.boards.read().await;
        let docs: Vec<Board> = guard.values().filter(|b| filter.matches(b)).cloned().collect();
        Ok(sort_and_limit(
            docs,
            options,
            |b| (b.created_at, b.id),
            |b| b.updated_at,
        ))
    }

    async fn find_one_and_update(
        &self,
        filter: BoardFilter,
        patch: BoardPatch,
    ) -> TaskboardResult<Option<Board>> {
        let mut guard = self.boards.write().await;
        let target = guard
            .values()
            .filter(|b| filter.matches(b))
            .min_by_key(|b| (b.created_at, b.id))
            .map(|b| b.id);
        let Some(id) = target else {
            return Ok(None);
        };
        if let Some(board) = guard.get_mut(&id) {
            patch.apply(board, Utc::now());
            return Ok(Some(board.clone()));
        }
        Ok(None)
    }
}

#[async_trait]
impl ListStore for MemoryStore {
    async fn insert_one(&self, list: List) -> TaskboardResult<List> {
        let mut guard = self.lists.write().await;
        if guard.contains_key(&list.id) {
            return Err(TaskboardError::Internal(format!(
                "duplicate list id {}",
                list.id
            )));
        }
        tracing::debug!(list_id = %list.id, board_id = %list.board_id, "insert list");
        guard.insert(list.id, list.clone());
        Ok(list)
    }

    async fn find_one(&self, id: ListId) -> TaskboardResult<Option<List>> {
        Ok(self.lists.read().await.get(&id).cloned())
    }

    async fn find(&self, filter: ListFilter, options: FindOptions) -> TaskboardResult<Vec<List>> {
        let guard = self.lists.read().await;
        let docs: Vec<List> = guard.values().filter(|l| filter.matches(l)).cloned().collect();
        Ok(sort_and_limit(
            docs,
            options,
            |l| (l.created_at, l.id),
            |l| l.updated_at,
        ))
    }

    async fn find_one_and_update(
        &self,
        filter: ListFilter,
        patch: ListPatch,
    ) -> TaskboardResult<Option<List>> {
        let mut guard = self.lists.write().await;
        let target = guard
            .values()
            .filter(|l| filter.matches(l))
            .min_by_key(|l| (l.created_at, l.id))
            .map(|l| l.id);
        let Some(id) = target else {
            return Ok(None);
        };
        if let Some(list) = guard.get_mut(&id) {
            patch.apply(list, Utc::now());
            return Ok(Some(list.clone()));
        }
        Ok(None)
    }

    async fn update_many(&self, filter: ListFilter, patch: ListPatch) -> TaskboardResult<u64> {
        let mut guard = self.lists.write().await;
        let now = Utc::now();
        let mut modified = 0;
        for list in guard.values_mut().filter(|l| filter.matches(l)) {
            patch.clone().apply(list, now);
            modified += 1;
        }
        Ok(modified)
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn insert_one(&self, card: Card) -> TaskboardResult<Card> {
        let mut guard = self.cards.write().await;
        if guard.contains_key(&card.id) {
            return Err(TaskboardError::Internal(format!(
                "duplicate card id {}",
                card.id
            )));
        }
        tracing::debug!(card_id = %card.id, list_id = %card.list_id, "insert card");
        guard.insert(card.id, card.clone());
        Ok(card)
    }

    async fn find_one(&self, id: CardId) -> TaskboardResult<Option<Card>> {
        Ok(self.cards.read().await.get(&id).cloned())
    }

    async fn find(&self, filter: CardFilter, options: FindOptions) -> TaskboardResult<Vec<Card>> {
        let guard = self.cards.read().await;
        let docs: Vec<Card> = guard.values().filter(|c| filter.matches(c)).cloned().collect();
        Ok(sort_and_limit(
            docs,
            options,
            |c| (c.created_at, c.id),
            |c| c.updated_at,
        ))
    }

    async fn find_one_and_update(
        &self,
        filter: CardFilter,
        patch: CardPatch,
    ) -> TaskboardResult<Option<Card>> {
        let mut guard = self.cards.write().await;
        let target = guard
            .values()
            .filter(|c| filter.matches(c))
            .min_by_key(|c| (c.created_at, c.id))
            .map(|c| c.id);
        let Some(id) = target else {
            return Ok(None);
        };
        if let Some(card) = guard.get_mut(&id) {
            patch.apply(card, Utc::now());
            return Ok(Some(card.clone()));
        }
        Ok(None)
    }

    async fn update_many(&self, filter: CardFilter, patch: CardPatch) -> TaskboardResult<u64> {
        let mut guard = self.cards.write().await;
        let now = Utc::now();
        let mut modified = 0;
        for card in guard.values_mut().filter(|c| filter.matches(c)) {
            patch.clone().apply(card, now);
            modified += 1;
        }
        Ok(modified)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_one(&self, user: User) -> TaskboardResult<User> {
        let mut guard = self.users.write().await;
        if guard.values().any(|u| u.email == user.email) {
            return Err(TaskboardError::Conflict(ConflictReason::EmailTaken));
        }
        guard.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_one(&self, id: UserId) -> TaskboardResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> TaskboardResult<Option<User>> {
        let guard = self.users.read().await;
        Ok(guard.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> TaskboardResult<Vec<User>> {
        let guard = self.users.read().await;
        Ok(ids.iter().filter_map(|id| guard.get(id).cloned()).collect())
    }
}
