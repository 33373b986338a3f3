//! Board lifecycle manager.
//!
//! Owns the only two operations allowed to mutate `lists_order` in place
//! (append and remove-by-value); both are crate-private so outer callers
//! cannot bypass the list manager. Board deletion cascades to every list
//! and card of the board with two idempotent flat scans.

use std::sync::Arc;

use chrono::{Datelike, Utc};

use taskboard_core::{parse_ids, validate_title, ConflictReason, TaskboardError, TaskboardResult};
use taskboard_domain::{
    Board, BoardId, BoardWithCards, CompletedBoardsSummary, FieldUpdate, ListId, UserId,
};
use taskboard_persistence::{
    BoardFilter, BoardPatch, BoardStore, CardFilter, CardStore, FindOptions, ListFilter,
    ListPatch, ListStore, SortOrder, UserStore,
};

use crate::card_service::CardService;

/// Partial board update. A supplied `lists_order` replaces the array
/// wholesale once every element parses to a canonical id; whether it is a
/// permutation of the board's live lists is the caller's responsibility.
#[derive(Debug, Clone, Default)]
pub struct BoardUpdateRequest {
    pub title: Option<String>,
    pub background: FieldUpdate<String>,
    pub is_completed: Option<bool>,
    pub lists_order: Option<Vec<String>>,
}

pub struct BoardService {
    boards: Arc<dyn BoardStore>,
    lists: Arc<dyn ListStore>,
    cards: Arc<dyn CardStore>,
    users: Arc<dyn UserStore>,
    card_service: Arc<CardService>,
}

impl BoardService {
    pub fn new(
        boards: Arc<dyn BoardStore>,
        lists: Arc<dyn ListStore>,
        cards: Arc<dyn CardStore>,
        users: Arc<dyn UserStore>,
        card_service: Arc<CardService>,
    ) -> Self {
        Self {
            boards,
            lists,
            cards,
            users,
            card_service,
        }
    }

    /// Create a board with an empty `lists_order`.
    pub async fn create(
        &self,
        title: &str,
        owner: UserId,
        members: Vec<UserId>,
    ) -> TaskboardResult<Board> {
        let title = validate_title(title)?;
        self.boards.insert_one(Board::new(title, owner, members)).await
    }

    /// Append a list id to the board's order array. Exposed to the list
    /// manager only.
    pub(crate) async fn push_lists_order(
        &self,
        board_id: BoardId,
        list_id: ListId,
    ) -> TaskboardResult<Board> {
        let patch = BoardPatch {
            push_lists_order: Some(list_id),
            ..Default::default()
        };
        self.boards
            .find_one_and_update(BoardFilter::live(board_id), patch)
            .await?
            .ok_or_else(|| TaskboardError::not_found("board", board_id))
    }

    /// Remove a list id from the board's order array. Matches by id alone
    /// so pruning still works on a board that was destroyed concurrently.
    pub(crate) async fn pull_lists_order(
        &self,
        board_id: BoardId,
        list_id: ListId,
    ) -> TaskboardResult<Board> {
        let patch = BoardPatch {
            pull_lists_order: Some(list_id),
            ..Default::default()
        };
        self.boards
            .find_one_and_update(BoardFilter::by_id(board_id), patch)
            .await?
            .ok_or_else(|| TaskboardError::not_found("board", board_id))
    }

    /// Partial field update; stamps `updated_at`.
    pub async fn update(
        &self,
        board_id: BoardId,
        update: BoardUpdateRequest,
    ) -> TaskboardResult<Board> {
        let patch = BoardPatch {
            title: update.title.as_deref().map(validate_title).transpose()?,
            background: update.background,
            is_completed: update.is_completed,
            lists_order: update
                .lists_order
                .as_deref()
                .map(|ids| parse_ids(ids))
                .transpose()?,
            ..Default::default()
        };
        self.boards
            .find_one_and_update(BoardFilter::live(board_id), patch)
            .await?
            .ok_or_else(|| TaskboardError::not_found("board", board_id))
    }

    /// Soft-delete the board, then cascade-destroy its lists and cards.
    /// Both cascades are idempotent flat scans over `board_id`, so their
    /// relative order does not matter and a re-run after a partial failure
    /// is safe.
    pub async fn soft_delete(&self, board_id: BoardId) -> TaskboardResult<Board> {
        let destroy = BoardPatch {
            destroyed: Some(true),
            ..Default::default()
        };
        let board = self
            .boards
            .find_one_and_update(BoardFilter::live(board_id), destroy)
            .await?
            .ok_or_else(|| TaskboardError::not_found("board", board_id))?;

        self.lists
            .update_many(
                ListFilter::live_in_board(board_id),
                ListPatch {
                    destroyed: Some(true),
                    ..Default::default()
                },
            )
            .await
            .map_err(|err| {
                TaskboardError::DependencyWriteFailed(format!(
                    "list cascade after destroying board {board_id}: {err}"
                ))
            })?;

        self.card_service
            .cascade_destroy_by_board(board_id)
            .await
            .map_err(|err| {
                TaskboardError::DependencyWriteFailed(format!(
                    "card cascade after destroying board {board_id}: {err}"
                ))
            })?;

        Ok(board)
    }

    /// Live boards the user owns.
    pub async fn your_boards(&self, user: UserId) -> TaskboardResult<Vec<Board>> {
        self.boards
            .find(
                BoardFilter {
                    owner: Some(user),
                    destroyed: Some(false),
                    ..Default::default()
                },
                FindOptions::default(),
            )
            .await
    }

    /// Live boards the user was invited to (member, not owner).
    pub async fn invited_boards(&self, user: UserId) -> TaskboardResult<Vec<Board>> {
        self.boards
            .find(
                BoardFilter {
                    member: Some(user),
                    destroyed: Some(false),
                    ..Default::default()
                },
                FindOptions::default(),
            )
            .await
    }

    /// The two most recently created accessible boards, with their cards
    /// eagerly attached for the dashboard preview.
    pub async fn board_progress(&self, user: UserId) -> TaskboardResult<Vec<BoardWithCards>> {
        let boards = self
            .boards
            .find(
                BoardFilter {
                    accessible_to: Some(user),
                    destroyed: Some(false),
                    ..Default::default()
                },
                FindOptions::sorted(SortOrder::CreatedAtDesc).with_limit(2),
            )
            .await?;

        let mut previews = Vec::with_capacity(boards.len());
        for board in boards {
            let cards = self
                .cards
                .find(CardFilter::live_in_board(board.id), FindOptions::default())
                .await?;
            previews.push(BoardWithCards { board, cards });
        }
        Ok(previews)
    }

    /// Completed accessible boards bucketed by calendar year of their last
    /// update: current year vs. the one before.
    pub async fn completed_boards(&self, user: UserId) -> TaskboardResult<CompletedBoardsSummary> {
        let boards = self
            .boards
            .find(
                BoardFilter {
                    accessible_to: Some(user),
                    destroyed: Some(false),
                    is_completed: Some(true),
                    ..Default::default()
                },
                FindOptions::sorted(SortOrder::UpdatedAtAsc),
            )
            .await?;

        let current_year = Utc::now().year();
        let mut summary = CompletedBoardsSummary::default();
        for board in boards {
            let year = board.updated_at.year();
            if year == current_year {
                summary.current_year += 1;
            } else if year == current_year - 1 {
                summary.last_year += 1;
            }
        }
        Ok(summary)
    }

    /// Title search over the user's accessible live boards.
    pub async fn search_boards(&self, query: &str, user: UserId) -> TaskboardResult<Vec<Board>> {
        self.boards
            .find(
                BoardFilter {
                    accessible_to: Some(user),
                    destroyed: Some(false),
                    title_contains: Some(query.trim().to_string()),
                    ..Default::default()
                },
                FindOptions::default(),
            )
            .await
    }

    /// Add a member by email. Only the owner may add; a missing user and an
    /// already-present one are distinct conflicts the caller can branch on.
    pub async fn add_member(
        &self,
        actor: UserId,
        board_id: BoardId,
        email: &str,
    ) -> TaskboardResult<Board> {
        let board = self.live_board(board_id).await?;
        if !board.is_owner(actor) {
            return Err(TaskboardError::Unauthorized(
                "only the board owner can add members".to_string(),
            ));
        }

        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or(TaskboardError::Conflict(ConflictReason::UserNotFound))?;
        if board.is_owner(user.id) || board.is_member(user.id) {
            return Err(TaskboardError::Conflict(ConflictReason::AlreadyMember));
        }

        let patch = BoardPatch {
            push_member: Some(user.id),
            ..Default::default()
        };
        self.boards
            .find_one_and_update(BoardFilter::live(board_id), patch)
            .await?
            .ok_or_else(|| TaskboardError::not_found("board", board_id))
    }

    /// Remove a member; owner-only.
    pub async fn remove_member(
        &self,
        actor: UserId,
        board_id: BoardId,
        member: UserId,
    ) -> TaskboardResult<Board> {
        let board = self.live_board(board_id).await?;
        if !board.is_owner(actor) {
            return Err(TaskboardError::Unauthorized(
                "only the board owner can remove members".to_string(),
            ));
        }
        self.pull_member(board_id, member).await
    }

    /// Self-service removal: any member can leave, no ownership check.
    pub async fn leave_board(&self, user: UserId, board_id: BoardId) -> TaskboardResult<Board> {
        self.pull_member(board_id, user).await
    }

    /// Access predicate consumed by outer collaborators.
    pub async fn is_owner(&self, board_id: BoardId, user: UserId) -> TaskboardResult<bool> {
        Ok(self
            .boards
            .find_one(board_id)
            .await?
            .is_some_and(|b| !b.destroyed && b.is_owner(user)))
    }

    /// Access predicate consumed by outer collaborators.
    pub async fn is_member(&self, board_id: BoardId, user: UserId) -> TaskboardResult<bool> {
        Ok(self
            .boards
            .find_one(board_id)
            .await?
            .is_some_and(|b| !b.destroyed && b.is_member(user)))
    }

    async fn pull_member(&self, board_id: BoardId, member: UserId) -> TaskboardResult<Board> {
        let patch = BoardPatch {
            pull_member: Some(member),
            ..Default::default()
        };
        self.boards
            .find_one_and_update(BoardFilter::live(board_id), patch)
            .await?
            .ok_or_else(|| TaskboardError::not_found("board", board_id))
    }

    async fn live_board(&self, board_id: BoardId) -> TaskboardResult<Board> {
        self.boards
            .find_one(board_id)
            .await?
            .filter(|b| !b.destroyed)
            .ok_or_else(|| TaskboardError::not_found("board", board_id))
    }
}
