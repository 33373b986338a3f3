//! Read-side board view assembler.
//!
//! Builds the fully nested board projection in three queries plus one user
//! batch lookup, then stitches the pieces together in memory following the
//! order arrays. The assembler is the tolerant half of the ordering
//! contract: writers keep the arrays correct where that is cheap, and any
//! id the arrays carry that no longer resolves to a live document in the
//! right parent is silently skipped here.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use taskboard_core::{TaskboardError, TaskboardResult};
use taskboard_domain::{
    BoardId, BoardView, Card, CardId, CardView, List, ListId, ListView, UserId, UserSummary,
};
use taskboard_persistence::{
    BoardFilter, BoardStore, CardFilter, CardStore, FindOptions, ListFilter, ListStore, UserStore,
};

pub struct BoardViewAssembler {
    boards: Arc<dyn BoardStore>,
    lists: Arc<dyn ListStore>,
    cards: Arc<dyn CardStore>,
    users: Arc<dyn UserStore>,
}

impl BoardViewAssembler {
    pub fn new(
        boards: Arc<dyn BoardStore>,
        lists: Arc<dyn ListStore>,
        cards: Arc<dyn CardStore>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        Self {
            boards,
            lists,
            cards,
            users,
        }
    }

    pub async fn assemble(&self, board_id: BoardId) -> TaskboardResult<BoardView> {
        let board = self
            .boards
            .find(BoardFilter::live(board_id), FindOptions::default())
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| TaskboardError::not_found("board", board_id))?;

        let (lists, cards) = tokio::try_join!(
            self.lists
                .find(ListFilter::live_in_board(board_id), FindOptions::default()),
            self.cards
                .find(CardFilter::live_in_board(board_id), FindOptions::default()),
        )?;

        let summaries = self.user_summaries(&board, &cards).await?;

        let mut lists_by_id: HashMap<ListId, List> =
            lists.into_iter().map(|l| (l.id, l)).collect();
        let cards_by_id: HashMap<CardId, Card> =
            cards.into_iter().map(|c| (c.id, c)).collect();

        let mut list_views = Vec::with_capacity(board.lists_order.len());
        for list_id in &board.lists_order {
            // Dangling entries (destroyed list, unpruned array) drop out.
            let Some(list) = lists_by_id.remove(list_id) else {
                continue;
            };
            list_views.push(assemble_list(list, &cards_by_id, &summaries));
        }

        let owner = summaries.get(&board.owner).cloned();
        let members = board
            .members
            .iter()
            .filter_map(|id| summaries.get(id).cloned())
            .collect();

        Ok(BoardView {
            board,
            owner,
            members,
            lists: list_views,
        })
    }

    /// One batched lookup for every user the view references.
    async fn user_summaries(
        &self,
        board: &taskboard_domain::Board,
        cards: &[Card],
    ) -> TaskboardResult<HashMap<UserId, UserSummary>> {
        let mut ids: Vec<UserId> = Vec::with_capacity(board.members.len() + 1);
        let mut seen = HashSet::new();
        for id in std::iter::once(board.owner)
            .chain(board.members.iter().copied())
            .chain(cards.iter().filter_map(|c| c.assignee))
        {
            if seen.insert(id) {
                ids.push(id);
            }
        }

        let users = self.users.find_by_ids(&ids).await?;
        Ok(users.into_iter().map(|u| (u.id, u.summary())).collect())
    }
}

fn assemble_list(
    list: List,
    cards_by_id: &HashMap<CardId, Card>,
    summaries: &HashMap<UserId, UserSummary>,
) -> ListView {
    let mut cards = Vec::with_capacity(list.cards_order.len());
    let mut seen = HashSet::with_capacity(list.cards_order.len());
    for card_id in &list.cards_order {
        if !seen.insert(*card_id) {
            continue;
        }
        let Some(card) = cards_by_id.get(card_id) else {
            continue;
        };
        // A half-finished move can leave the card in this array while it
        // already points at another list; the other list's entry wins.
        if card.list_id != list.id {
            continue;
        }
        cards.push(CardView {
            card: card.clone(),
            assignee: card.assignee.and_then(|id| summaries.get(&id).cloned()),
        });
    }
    ListView { list, cards }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_domain::User;
    use taskboard_persistence::{CardPatch, ListPatch, MemoryStore};
    use uuid::Uuid;

    use crate::{
        board_service::BoardService, card_service::CardService, list_service::ListService,
    };

    struct Fixture {
        store: Arc<MemoryStore>,
        assembler: BoardViewAssembler,
        boards: Arc<BoardService>,
        lists: ListService,
        cards: Arc<CardService>,
    }

    fn wire() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let cards = Arc::new(CardService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        ));
        let boards = Arc::new(BoardService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
            cards.clone(),
        ));
        let lists = ListService::new(store.clone(), boards.clone(), cards.clone());
        let assembler = BoardViewAssembler::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store.clone(),
        );
        Fixture {
            store,
            assembler,
            boards,
            lists,
            cards,
        }
    }

    async fn seed_user(store: &Arc<MemoryStore>, username: &str) -> User {
        UserStore::insert_one(
            store.as_ref(),
            User::new(
                username.to_string(),
                format!("{username}@example.com"),
                username.to_string(),
            ),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_view_follows_order_arrays() {
        let fx = wire();
        let owner = seed_user(&fx.store, "alice").await;
        let board = fx.boards.create("Sprint 1", owner.id, vec![]).await.unwrap();

        let (todo, _) = fx.lists.create(board.id, "Todo").await.unwrap();
        fx.lists.create(board.id, "Doing").await.unwrap();
        let (first, _) = fx
            .cards
            .create(board.id, todo.list.id, "Fix bug")
            .await
            .unwrap();
        let (second, _) = fx
            .cards
            .create(board.id, todo.list.id, "Write docs")
            .await
            .unwrap();

        let view = fx.assembler.assemble(board.id).await.unwrap();
        assert_eq!(view.board.id, board.id);
        assert_eq!(view.owner.as_ref().unwrap().username, "alice");

        // Lists in creation order, cards newest-first within the list.
        let titles: Vec<&str> = view.lists.iter().map(|l| l.list.title.as_str()).collect();
        assert_eq!(titles, vec!["Todo", "Doing"]);
        let card_ids: Vec<_> = view.lists[0].cards.iter().map(|c| c.card.id).collect();
        assert_eq!(card_ids, vec![second.id, first.id]);
        assert!(view.lists[1].cards.is_empty());
    }

    #[tokio::test]
    async fn test_view_resolves_assignees_and_members() {
        let fx = wire();
        let owner = seed_user(&fx.store, "alice").await;
        let member = seed_user(&fx.store, "bob").await;
        let board = fx.boards.create("Sprint 1", owner.id, vec![]).await.unwrap();
        fx.boards
            .add_member(owner.id, board.id, "bob@example.com")
            .await
            .unwrap();

        let (todo, _) = fx.lists.create(board.id, "Todo").await.unwrap();
        let (card, _) = fx
            .cards
            .create(board.id, todo.list.id, "Fix bug")
            .await
            .unwrap();
        CardStore::find_one_and_update(
            fx.store.as_ref(),
            CardFilter::live(card.id),
            CardPatch {
                assignee: taskboard_domain::FieldUpdate::Set(member.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let view = fx.assembler.assemble(board.id).await.unwrap();
        assert_eq!(view.members.len(), 1);
        assert_eq!(view.members[0].username, "bob");
        let assignee = view.lists[0].cards[0].assignee.as_ref().unwrap();
        assert_eq!(assignee.id, member.id);
    }

    #[tokio::test]
    async fn test_view_skips_dangling_and_destroyed_entries() {
        let fx = wire();
        let owner = seed_user(&fx.store, "alice").await;
        let board = fx.boards.create("Sprint 1", owner.id, vec![]).await.unwrap();
        let (todo, _) = fx.lists.create(board.id, "Todo").await.unwrap();
        let (card, _) = fx
            .cards
            .create(board.id, todo.list.id, "Fix bug")
            .await
            .unwrap();

        // Soft-delete the card directly so its id stays in cards_order.
        CardStore::find_one_and_update(
            fx.store.as_ref(),
            CardFilter::live(card.id),
            CardPatch {
                destroyed: Some(true),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        // And plant an id that resolves to nothing at all.
        ListStore::find_one_and_update(
            fx.store.as_ref(),
            ListFilter::live(todo.list.id),
            ListPatch {
                push_cards_order_front: Some(Uuid::new_v4()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let view = fx.assembler.assemble(board.id).await.unwrap();
        assert!(view.lists[0].cards.is_empty());
    }

    #[tokio::test]
    async fn test_view_skips_card_claimed_by_another_list() {
        let fx = wire();
        let owner = seed_user(&fx.store, "alice").await;
        let board = fx.boards.create("Sprint 1", owner.id, vec![]).await.unwrap();
        let (todo, _) = fx.lists.create(board.id, "Todo").await.unwrap();
        let (doing, _) = fx.lists.create(board.id, "Doing").await.unwrap();
        let (card, _) = fx
            .cards
            .create(board.id, todo.list.id, "Fix bug")
            .await
            .unwrap();

        // Simulate a move that reparented the card but never pruned the
        // source array.
        CardStore::find_one_and_update(
            fx.store.as_ref(),
            CardFilter::live(card.id),
            CardPatch {
                list_id: Some(doing.list.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        ListStore::find_one_and_update(
            fx.store.as_ref(),
            ListFilter::live(doing.list.id),
            ListPatch {
                push_cards_order_front: Some(card.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let view = fx.assembler.assemble(board.id).await.unwrap();
        assert!(view.lists[0].cards.is_empty());
        assert_eq!(view.lists[1].cards.len(), 1);
        assert_eq!(view.lists[1].cards[0].card.id, card.id);
    }

    #[tokio::test]
    async fn test_destroyed_board_is_not_found() {
        let fx = wire();
        let owner = seed_user(&fx.store, "alice").await;
        let board = fx.boards.create("Sprint 1", owner.id, vec![]).await.unwrap();
        fx.boards.soft_delete(board.id).await.unwrap();

        let err = fx.assembler.assemble(board.id).await.unwrap_err();
        assert!(matches!(err, TaskboardError::NotFound(_)));
    }
}
