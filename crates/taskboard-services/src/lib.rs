//! The consistency engine: lifecycle managers that keep the denormalized
//! order arrays in sync with the underlying documents, the move coordinator,
//! and the read-side board view assembler.
//!
//! Managers receive their stores at construction; nothing reaches for a
//! global handle. Writers maintain the order-array invariants where that is
//! cheap, the assembler filters defensively where it is not.

pub mod board_service;
pub mod board_view;
pub mod card_service;
pub mod list_service;
pub mod move_coordinator;

pub use board_service::{BoardService, BoardUpdateRequest};
pub use board_view::BoardViewAssembler;
pub use card_service::{CardService, CardUpdateRequest};
pub use list_service::{ListService, ListUpdateRequest};
pub use move_coordinator::{MoveCardRequest, MoveCardResult, MoveCoordinator};
