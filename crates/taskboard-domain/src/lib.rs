pub mod analytics;
pub mod board;
pub mod card;
pub mod field_update;
pub mod list;
pub mod user;
pub mod view;

pub use analytics::{
    BoardWithCards, CompletedBoardsSummary, MonthlyBucket, MonthlyCardStats, WeeklyCardCounts,
};
pub use board::{Board, BoardId};
pub use card::{Card, CardId};
pub use field_update::FieldUpdate;
pub use list::{List, ListId};
pub use user::{User, UserId};
pub use view::{BoardView, CardView, ListView, UserSummary};
