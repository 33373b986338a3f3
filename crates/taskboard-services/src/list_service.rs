//! List lifecycle manager.
//!
//! Creation appends the list to its board's order array through the board
//! manager's append primitive. Deletion is a three-step cascade: destroy
//! the list, cascade-destroy its cards, then prune the board's order array.
//! A failure after step one leaves destroyed-but-unpruned state behind;
//! that is tolerable because every read filters on the destroy flag, but it
//! is always surfaced to the caller as a dependent-write failure.

use std::sync::Arc;

use taskboard_core::{parse_ids, validate_title, TaskboardError, TaskboardResult};
use taskboard_domain::{Board, BoardId, List, ListId, ListView};
use taskboard_persistence::{ListFilter, ListPatch, ListStore};

use crate::{board_service::BoardService, card_service::CardService};

/// Partial list update. `cards_order` arrives as raw ids from a client-side
/// reorder and replaces the array wholesale once every element parses.
#[derive(Debug, Clone, Default)]
pub struct ListUpdateRequest {
    pub title: Option<String>,
    pub cards_order: Option<Vec<String>>,
}

pub struct ListService {
    lists: Arc<dyn ListStore>,
    board_service: Arc<BoardService>,
    card_service: Arc<CardService>,
}

impl ListService {
    pub fn new(
        lists: Arc<dyn ListStore>,
        board_service: Arc<BoardService>,
        card_service: Arc<CardService>,
    ) -> Self {
        Self {
            lists,
            board_service,
            card_service,
        }
    }

    /// Create a list with an empty card order and append it to the board's
    /// `lists_order`. Returns the new list (empty cards projection) and the
    /// updated board.
    pub async fn create(&self, board_id: BoardId, title: &str) -> TaskboardResult<(ListView, Board)> {
        let title = validate_title(title)?;
        let list = self.lists.insert_one(List::new(board_id, title)).await?;

        let board = match self.board_service.push_lists_order(board_id, list.id).await {
            Ok(board) => board,
            Err(err) => {
                tracing::error!(
                    list_id = %list.id,
                    %board_id,
                    "board missing at append time; created list is orphaned"
                );
                return Err(err);
            }
        };

        Ok((
            ListView {
                list,
                cards: Vec::new(),
            },
            board,
        ))
    }

    /// Partial field update; stamps `updated_at`.
    pub async fn update(&self, list_id: ListId, update: ListUpdateRequest) -> TaskboardResult<List> {
        let patch = ListPatch {
            title: update.title.as_deref().map(validate_title).transpose()?,
            cards_order: update
                .cards_order
                .as_deref()
                .map(|ids| parse_ids(ids))
                .transpose()?,
            ..Default::default()
        };
        self.lists
            .find_one_and_update(ListFilter::live(list_id), patch)
            .await?
            .ok_or_else(|| TaskboardError::not_found("list", list_id))
    }

    /// Soft-delete the list, cascade-destroy its cards, and prune the
    /// board's order array, in that order. Steps two and three run after
    /// the destroy flag is committed, so their failures surface as
    /// `DependencyWriteFailed` instead of being rolled back.
    pub async fn soft_delete(&self, list_id: ListId) -> TaskboardResult<(List, Board)> {
        let destroy = ListPatch {
            destroyed: Some(true),
            ..Default::default()
        };
        let list = self
            .lists
            .find_one_and_update(ListFilter::live(list_id), destroy)
            .await?
            .ok_or_else(|| TaskboardError::not_found("list", list_id))?;

        self.card_service
            .cascade_destroy_by_list(list.id)
            .await
            .map_err(|err| {
                TaskboardError::DependencyWriteFailed(format!(
                    "card cascade after destroying list {}: {err}",
                    list.id
                ))
            })?;

        let board = self
            .board_service
            .pull_lists_order(list.board_id, list.id)
            .await
            .map_err(|err| {
                TaskboardError::DependencyWriteFailed(format!(
                    "pruning list {} from board {}: {err}",
                    list.id, list.board_id
                ))
            })?;

        Ok((list, board))
    }
}
