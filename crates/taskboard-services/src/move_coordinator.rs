//! Move coordinator.
//!
//! Relocates a card between lists using the complete order snapshots the
//! client computed. Three single-document writes, no transaction spanning
//! them: the card's parent pointer, then the source order array, then the
//! destination order array. A failure after the first write is surfaced as
//! `DependencyWriteFailed` and never rolled back; the snapshots are safe to
//! resubmit unchanged.

use std::collections::HashSet;
use std::sync::Arc;

use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::{Card, CardId, List, ListId};
use taskboard_persistence::{CardFilter, CardPatch, CardStore, ListFilter, ListPatch, ListStore};

#[derive(Debug, Clone)]
pub struct MoveCardRequest {
    pub card_id: CardId,
    pub source_list_id: ListId,
    /// Complete new order of the source list, with the card removed.
    pub source_cards_order: Vec<CardId>,
    pub dest_list_id: ListId,
    /// Complete new order of the destination list, containing the card at
    /// its final position.
    pub dest_cards_order: Vec<CardId>,
}

#[derive(Debug, Clone)]
pub struct MoveCardResult {
    pub card: Card,
    pub source_list: List,
    pub dest_list: List,
}

pub struct MoveCoordinator {
    cards: Arc<dyn CardStore>,
    lists: Arc<dyn ListStore>,
}

impl MoveCoordinator {
    pub fn new(cards: Arc<dyn CardStore>, lists: Arc<dyn ListStore>) -> Self {
        Self { cards, lists }
    }

    pub async fn move_card(&self, request: MoveCardRequest) -> TaskboardResult<MoveCardResult> {
        validate_snapshots(&request)?;

        // Step 1: nothing committed yet, a miss is a plain not-found.
        let reparent = CardPatch {
            list_id: Some(request.dest_list_id),
            ..Default::default()
        };
        let card = self
            .cards
            .find_one_and_update(CardFilter::live(request.card_id), reparent)
            .await?
            .ok_or_else(|| TaskboardError::not_found("card", request.card_id))?;

        let source_list = self
            .overwrite_order(request.source_list_id, request.source_cards_order.clone())
            .await
            .map_err(|err| self.partial_failure("source", &request, err))?;

        let dest_list = self
            .overwrite_order(request.dest_list_id, request.dest_cards_order.clone())
            .await
            .map_err(|err| self.partial_failure("destination", &request, err))?;

        Ok(MoveCardResult {
            card,
            source_list,
            dest_list,
        })
    }

    async fn overwrite_order(
        &self,
        list_id: ListId,
        cards_order: Vec<CardId>,
    ) -> TaskboardResult<List> {
        let patch = ListPatch {
            cards_order: Some(cards_order),
            ..Default::default()
        };
        self.lists
            .find_one_and_update(ListFilter::live(list_id), patch)
            .await?
            .ok_or_else(|| TaskboardError::not_found("list", list_id))
    }

    fn partial_failure(
        &self,
        side: &str,
        request: &MoveCardRequest,
        err: TaskboardError,
    ) -> TaskboardError {
        tracing::error!(
            card_id = %request.card_id,
            source = %request.source_list_id,
            dest = %request.dest_list_id,
            %err,
            "move left a partial write; caller may resubmit the same snapshots"
        );
        TaskboardError::DependencyWriteFailed(format!(
            "{side} list update while moving card {}: {err}",
            request.card_id
        ))
    }
}

/// Cheap write-time checks on the client-supplied snapshots. Anything that
/// passes here can still race another move; reads stay defensive either way.
fn validate_snapshots(request: &MoveCardRequest) -> TaskboardResult<()> {
    if request.source_list_id == request.dest_list_id {
        return Err(TaskboardError::Validation(
            "move requires two distinct lists; same-list reorders go through list update"
                .to_string(),
        ));
    }
    if request.source_cards_order.contains(&request.card_id) {
        return Err(TaskboardError::Validation(
            "moved card must not remain in the source order snapshot".to_string(),
        ));
    }
    let in_dest = request
        .dest_cards_order
        .iter()
        .filter(|id| **id == request.card_id)
        .count();
    if in_dest != 1 {
        return Err(TaskboardError::Validation(format!(
            "moved card must appear exactly once in the destination snapshot, found {in_dest}"
        )));
    }
    if has_duplicates(&request.source_cards_order) || has_duplicates(&request.dest_cards_order) {
        return Err(TaskboardError::Validation(
            "order snapshot contains duplicate card ids".to_string(),
        ));
    }
    Ok(())
}

fn has_duplicates(ids: &[CardId]) -> bool {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().any(|id| !seen.insert(*id))
}
