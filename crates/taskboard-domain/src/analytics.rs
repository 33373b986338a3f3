//! Dashboard aggregation result types.

use serde::{Deserialize, Serialize};

use crate::{board::Board, card::Card};

/// A recent board with its cards eagerly attached for the dashboard preview.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardWithCards {
    pub board: Board,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub all_tasks: u32,
    pub done_tasks: u32,
}

/// Per-month task counts for the current calendar year. Index 0 is January.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonthlyCardStats {
    pub months: [MonthlyBucket; 12],
}

impl MonthlyCardStats {
    /// Bucket for a 1-based month number. Out-of-range months panic via the
    /// index.
    pub fn month_mut(&mut self, month: u32) -> &mut MonthlyBucket {
        &mut self.months[(month as usize) - 1]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyCardCounts {
    pub current_week: u32,
    pub last_week: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedBoardsSummary {
    pub current_year: u32,
    pub last_year: u32,
}
