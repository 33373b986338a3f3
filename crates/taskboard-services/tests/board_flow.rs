//! End-to-end flow over the in-memory store: a board with lists and cards
//! is built up, read back through the view assembler, mutated through the
//! move coordinator, and torn down through the cascades.

use std::sync::Arc;

use taskboard_core::{ConflictReason, TaskboardError};
use taskboard_domain::User;
use taskboard_persistence::{
    CardFilter, CardStore, FindOptions, ListFilter, ListStore, MemoryStore, UserStore,
};
use taskboard_services::{
    BoardService, BoardViewAssembler, CardService, ListService, MoveCardRequest, MoveCoordinator,
};

struct Engine {
    store: Arc<MemoryStore>,
    boards: Arc<BoardService>,
    lists: ListService,
    cards: Arc<CardService>,
    mover: MoveCoordinator,
    assembler: BoardViewAssembler,
}

fn engine() -> Engine {
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
    let mover = MoveCoordinator::new(store.clone(), store.clone());
    let assembler = BoardViewAssembler::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
    );
    Engine {
        store,
        boards,
        lists,
        cards,
        mover,
        assembler,
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
async fn build_up_view_and_tear_down_a_list() {
    let engine = engine();
    let alice = seed_user(&engine.store, "alice").await;

    let board = engine
        .boards
        .create("Sprint 1", alice.id, vec![])
        .await
        .unwrap();
    let (todo, _) = engine.lists.create(board.id, "Todo").await.unwrap();
    let (c1, _) = engine
        .cards
        .create(board.id, todo.list.id, "Fix bug")
        .await
        .unwrap();
    let (c2, list_after) = engine
        .cards
        .create(board.id, todo.list.id, "Write docs")
        .await
        .unwrap();

    // Newest card first.
    assert_eq!(list_after.cards_order, vec![c2.id, c1.id]);

    let view = engine.assembler.assemble(board.id).await.unwrap();
    assert_eq!(view.lists.len(), 1);
    let card_ids: Vec<_> = view.lists[0].cards.iter().map(|c| c.card.id).collect();
    assert_eq!(card_ids, vec![c2.id, c1.id]);

    // Deleting the list destroys its cards and empties lists_order.
    let (_, board_after) = engine.lists.soft_delete(todo.list.id).await.unwrap();
    assert!(board_after.lists_order.is_empty());
    for id in [c1.id, c2.id] {
        let card = CardStore::find_one(engine.store.as_ref(), id)
            .await
            .unwrap()
            .unwrap();
        assert!(card.destroyed);
    }

    let view = engine.assembler.assemble(board.id).await.unwrap();
    assert!(view.lists.is_empty());
}

#[tokio::test]
async fn board_delete_cascades_everywhere_and_is_not_repeatable() {
    let engine = engine();
    let alice = seed_user(&engine.store, "alice").await;

    let board = engine
        .boards
        .create("Sprint 1", alice.id, vec![])
        .await
        .unwrap();
    let (todo, _) = engine.lists.create(board.id, "Todo").await.unwrap();
    let (doing, _) = engine.lists.create(board.id, "Doing").await.unwrap();
    engine
        .cards
        .create(board.id, todo.list.id, "Fix bug")
        .await
        .unwrap();
    engine
        .cards
        .create(board.id, doing.list.id, "Review PR")
        .await
        .unwrap();

    let deleted = engine.boards.soft_delete(board.id).await.unwrap();
    assert!(deleted.destroyed);

    let live_lists = ListStore::find(
        engine.store.as_ref(),
        ListFilter::live_in_board(board.id),
        FindOptions::default(),
    )
    .await
    .unwrap();
    assert!(live_lists.is_empty());
    let live_cards = CardStore::find(
        engine.store.as_ref(),
        CardFilter::live_in_board(board.id),
        FindOptions::default(),
    )
    .await
    .unwrap();
    assert!(live_cards.is_empty());

    // The destroy flag makes the second delete a miss, not a re-cascade.
    let err = engine.boards.soft_delete(board.id).await.unwrap_err();
    assert!(matches!(err, TaskboardError::NotFound(_)));

    let err = engine.assembler.assemble(board.id).await.unwrap_err();
    assert!(matches!(err, TaskboardError::NotFound(_)));
}

#[tokio::test]
async fn move_card_end_to_end_through_the_view() {
    let engine = engine();
    let alice = seed_user(&engine.store, "alice").await;

    let board = engine
        .boards
        .create("Sprint 1", alice.id, vec![])
        .await
        .unwrap();
    let (todo, _) = engine.lists.create(board.id, "Todo").await.unwrap();
    let (doing, _) = engine.lists.create(board.id, "Doing").await.unwrap();
    let (moved, _) = engine
        .cards
        .create(board.id, todo.list.id, "Fix bug")
        .await
        .unwrap();
    let (stays, _) = engine
        .cards
        .create(board.id, todo.list.id, "Write docs")
        .await
        .unwrap();
    let (existing, _) = engine
        .cards
        .create(board.id, doing.list.id, "Review PR")
        .await
        .unwrap();

    engine
        .mover
        .move_card(MoveCardRequest {
            card_id: moved.id,
            source_list_id: todo.list.id,
            source_cards_order: vec![stays.id],
            dest_list_id: doing.list.id,
            dest_cards_order: vec![existing.id, moved.id],
        })
        .await
        .unwrap();

    let view = engine.assembler.assemble(board.id).await.unwrap();
    let todo_ids: Vec<_> = view.lists[0].cards.iter().map(|c| c.card.id).collect();
    let doing_ids: Vec<_> = view.lists[1].cards.iter().map(|c| c.card.id).collect();
    assert_eq!(todo_ids, vec![stays.id]);
    assert_eq!(doing_ids, vec![existing.id, moved.id]);
}

#[tokio::test]
async fn membership_outcomes_are_distinct() {
    let engine = engine();
    let alice = seed_user(&engine.store, "alice").await;
    let bob = seed_user(&engine.store, "bob").await;

    let board = engine
        .boards
        .create("Sprint 1", alice.id, vec![])
        .await
        .unwrap();

    // Non-owner actor.
    let err = engine
        .boards
        .add_member(bob.id, board.id, "bob@example.com")
        .await
        .unwrap_err();
    assert!(matches!(err, TaskboardError::Unauthorized(_)));

    // Unknown email.
    let err = engine
        .boards
        .add_member(alice.id, board.id, "nobody@example.com")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TaskboardError::Conflict(ConflictReason::UserNotFound)
    ));

    let updated = engine
        .boards
        .add_member(alice.id, board.id, "bob@example.com")
        .await
        .unwrap();
    assert!(updated.is_member(bob.id));

    // Repeat invitation.
    let err = engine
        .boards
        .add_member(alice.id, board.id, "bob@example.com")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        TaskboardError::Conflict(ConflictReason::AlreadyMember)
    ));

    let view = engine.assembler.assemble(board.id).await.unwrap();
    assert_eq!(view.members.len(), 1);
    assert_eq!(view.members[0].username, "bob");

    let after_leave = engine.boards.leave_board(bob.id, board.id).await.unwrap();
    assert!(!after_leave.is_member(bob.id));
}
