pub mod store;
pub mod traits;

pub use store::MemoryStore;
pub use traits::{
    BoardFilter, BoardPatch, BoardStore, CardFilter, CardPatch, CardStore, FindOptions,
    ListFilter, ListPatch, ListStore, SortOrder, UserStore,
};
