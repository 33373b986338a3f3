//! Card lifecycle manager.
//!
//! Creation registers the new card at the head of its list's order array.
//! Deletion only flips the destroy flag; order arrays keep the dangling id
//! until a list/board cascade prunes it, and the view assembler filters it
//! out of every read in the meantime.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};

use taskboard_core::{validate_title, TaskboardError, TaskboardResult};
use taskboard_domain::{
    Board, BoardId, Card, CardId, CardView, FieldUpdate, List, ListId, MonthlyCardStats, UserId,
    WeeklyCardCounts,
};
use taskboard_persistence::{
    BoardStore, CardFilter, CardPatch, CardStore, FindOptions, ListFilter, ListPatch, ListStore,
    UserStore,
};

/// Partial card update. `list_id` is deliberately absent: changing the
/// parent is a structural operation that must go through the move
/// coordinator so both order arrays are rewritten with it.
#[derive(Debug, Clone, Default)]
pub struct CardUpdateRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assignee: FieldUpdate<UserId>,
    pub is_completed: Option<bool>,
    pub cover: FieldUpdate<String>,
    pub ended_at: FieldUpdate<DateTime<Utc>>,
}

pub struct CardService {
    cards: Arc<dyn CardStore>,
    lists: Arc<dyn ListStore>,
    boards: Arc<dyn BoardStore>,
    users: Arc<dyn UserStore>,
}

impl CardService {
    pub fn new(
        cards: Arc<dyn CardStore>,
        lists: Arc<dyn ListStore>,
        boards: Arc<dyn BoardStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            cards,
            lists,
            boards,
            users,
        }
    }

    /// Create a card and atomically prepend it to the owning list's order
    /// array, so the newest card surfaces first.
    ///
    /// If the list is gone by the time the prepend runs, the already
    /// inserted card is orphaned. That is a consistency error we surface
    /// (and log) rather than retry: retrying the prepend cannot tell
    /// whether an earlier attempt half-succeeded.
    pub async fn create(
        &self,
        board_id: BoardId,
        list_id: ListId,
        title: &str,
    ) -> TaskboardResult<(Card, List)> {
        let title = validate_title(title)?;
        let card = self.cards.insert_one(Card::new(board_id, list_id, title)).await?;

        let prepend = ListPatch {
            push_cards_order_front: Some(card.id),
            ..Default::default()
        };
        match self
            .lists
            .find_one_and_update(ListFilter::live(list_id), prepend)
            .await?
        {
            Some(list) => Ok((card, list)),
            None => {
                tracing::error!(
                    card_id = %card.id,
                    list_id = %list_id,
                    "list missing at prepend time; created card is orphaned"
                );
                Err(TaskboardError::not_found("list", list_id))
            }
        }
    }

    /// Partial update of mutable fields. Returns the card with its assignee
    /// resolved to the id/username/avatar projection.
    pub async fn update(
        &self,
        card_id: CardId,
        update: CardUpdateRequest,
    ) -> TaskboardResult<CardView> {
        let patch = CardPatch {
            title: update.title.as_deref().map(validate_title).transpose()?,
            description: update.description,
            assignee: update.assignee,
            is_completed: update.is_completed,
            cover: update.cover,
            ended_at: update.ended_at,
            ..Default::default()
        };
        let card = self
            .cards
            .find_one_and_update(CardFilter::live(card_id), patch)
            .await?
            .ok_or_else(|| TaskboardError::not_found("card", card_id))?;

        let assignee = match card.assignee {
            Some(user_id) => self.users.find_one(user_id).await?.map(|u| u.summary()),
            None => None,
        };
        Ok(CardView { card, assignee })
    }

    /// Soft-delete a single card. The id stays in its list's `cards_order`;
    /// reads filter it, and list/board cascades prune it.
    pub async fn soft_delete(&self, card_id: CardId) -> TaskboardResult<Card> {
        let destroy = CardPatch {
            destroyed: Some(true),
            ..Default::default()
        };
        self.cards
            .find_one_and_update(CardFilter::live(card_id), destroy)
            .await?
            .ok_or_else(|| TaskboardError::not_found("card", card_id))
    }

    /// Bulk soft-delete every live card of a board. Idempotent: already
    /// destroyed cards no longer match the filter.
    pub async fn cascade_destroy_by_board(&self, board_id: BoardId) -> TaskboardResult<u64> {
        let destroyed = self
            .cards
            .update_many(
                CardFilter::live_in_board(board_id),
                CardPatch {
                    destroyed: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        tracing::debug!(%board_id, destroyed, "cascaded card destroy by board");
        Ok(destroyed)
    }

    /// Bulk soft-delete every live card of a list. Idempotent.
    pub async fn cascade_destroy_by_list(&self, list_id: ListId) -> TaskboardResult<u64> {
        let destroyed = self
            .cards
            .update_many(
                CardFilter::live_in_list(list_id),
                CardPatch {
                    destroyed: Some(true),
                    ..Default::default()
                },
            )
            .await?;
        tracing::debug!(%list_id, destroyed, "cascaded card destroy by list");
        Ok(destroyed)
    }

    /// Per-month all/done counts for the user's cards that ended in the
    /// current calendar year.
    pub async fn monthly_done_cards(&self, user: UserId) -> TaskboardResult<MonthlyCardStats> {
        let cards = self.assigned_live_cards(user).await?;
        let current_year = Utc::now().year();
        let mut stats = MonthlyCardStats::default();
        for card in cards {
            let Some(ended) = card.ended_at else { continue };
            if ended.year() != current_year {
                continue;
            }
            let bucket = stats.month_mut(ended.month());
            bucket.all_tasks += 1;
            if card.is_completed {
                bucket.done_tasks += 1;
            }
        }
        Ok(stats)
    }

    /// Completed-card counts for the current vs. previous ISO week.
    pub async fn weekly_done_cards(&self, user: UserId) -> TaskboardResult<WeeklyCardCounts> {
        let cards = self.assigned_live_cards(user).await?;
        let (current_week, last_week) = current_and_last_week();
        let mut counts = WeeklyCardCounts::default();
        for card in cards.iter().filter(|c| c.is_completed) {
            let Some(ended) = card.ended_at else { continue };
            let week = ended.iso_week().week();
            if week == current_week {
                counts.current_week += 1;
            } else if week == last_week {
                counts.last_week += 1;
            }
        }
        Ok(counts)
    }

    /// Newly created card counts for the current vs. previous ISO week.
    pub async fn weekly_new_cards(&self, user: UserId) -> TaskboardResult<WeeklyCardCounts> {
        let cards = self.assigned_live_cards(user).await?;
        let (current_week, last_week) = current_and_last_week();
        let mut counts = WeeklyCardCounts::default();
        for card in &cards {
            let week = card.created_at.iso_week().week();
            if week == current_week {
                counts.current_week += 1;
            } else if week == last_week {
                counts.last_week += 1;
            }
        }
        Ok(counts)
    }

    /// Title search over live cards, restricted to boards the user can see.
    pub async fn search_cards(&self, query: &str, user: UserId) -> TaskboardResult<Vec<Card>> {
        let matches = self
            .cards
            .find(
                CardFilter {
                    title_contains: Some(query.trim().to_string()),
                    destroyed: Some(false),
                    ..Default::default()
                },
                FindOptions::default(),
            )
            .await?;

        let mut access: HashMap<BoardId, bool> = HashMap::new();
        let mut visible = Vec::new();
        for card in matches {
            let allowed = match access.get(&card.board_id) {
                Some(allowed) => *allowed,
                None => {
                    let allowed = self
                        .boards
                        .find_one(card.board_id)
                        .await?
                        .is_some_and(|b: Board| !b.destroyed && b.has_access(user));
                    access.insert(card.board_id, allowed);
                    allowed
                }
            };
            if allowed {
                visible.push(card);
            }
        }
        Ok(visible)
    }

    async fn assigned_live_cards(&self, user: UserId) -> TaskboardResult<Vec<Card>> {
        self.cards
            .find(
                CardFilter {
                    assignee: Some(user),
                    destroyed: Some(false),
                    ..Default::default()
                },
                FindOptions::default(),
            )
            .await
    }
}

/// Week 1 has no predecessor within the year; the previous-week bucket
/// collapses onto week 1 in that case.
fn current_and_last_week() -> (u32, u32) {
    let current = Utc::now().iso_week().week();
    let last = if current == 1 { 1 } else { current - 1 };
    (current, last)
}
