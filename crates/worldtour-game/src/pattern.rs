//! The pattern matcher: which five-tile lines are complete.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BOARD_SIZE, FREE_INDEX};

/// One of the 12 winning lines on a 5×5 board: 5 rows, 5 columns,
/// 2 diagonals.
///
/// The wire representation matches the client protocol exactly
/// (`"row-0"`, `"col-3"`, `"diagonal-1"`, …), so a claim's pattern name
/// round-trips without any mapping layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WinPattern {
    #[serde(rename = "row-0")]
    Row0,
    #[serde(rename = "row-1")]
    Row1,
    #[serde(rename = "row-2")]
    Row2,
    #[serde(rename = "row-3")]
    Row3,
    #[serde(rename = "row-4")]
    Row4,
    #[serde(rename = "col-0")]
    Col0,
    #[serde(rename = "col-1")]
    Col1,
    #[serde(rename = "col-2")]
    Col2,
    #[serde(rename = "col-3")]
    Col3,
    #[serde(rename = "col-4")]
    Col4,
    /// Top-left to bottom-right.
    #[serde(rename = "diagonal-1")]
    Diagonal1,
    /// Top-right to bottom-left.
    #[serde(rename = "diagonal-2")]
    Diagonal2,
}

impl WinPattern {
    /// Every pattern, in the fixed enumeration order (rows, then columns,
    /// then diagonals). [`find_winning_patterns`] reports in this order,
    /// and the first element is "the" pattern where one must be chosen.
    pub const ALL: [WinPattern; 12] = [
        Self::Row0,
        Self::Row1,
        Self::Row2,
        Self::Row3,
        Self::Row4,
        Self::Col0,
        Self::Col1,
        Self::Col2,
        Self::Col3,
        Self::Col4,
        Self::Diagonal1,
        Self::Diagonal2,
    ];

    /// The 5 board indices (row-major, 0–24) making up this line.
    pub fn positions(self) -> [usize; 5] {
        match self {
            Self::Row0 => [0, 1, 2, 3, 4],
            Self::Row1 => [5, 6, 7, 8, 9],
            Self::Row2 => [10, 11, 12, 13, 14],
            Self::Row3 => [15, 16, 17, 18, 19],
            Self::Row4 => [20, 21, 22, 23, 24],
            Self::Col0 => [0, 5, 10, 15, 20],
            Self::Col1 => [1, 6, 11, 16, 21],
            Self::Col2 => [2, 7, 12, 17, 22],
            Self::Col3 => [3, 8, 13, 18, 23],
            Self::Col4 => [4, 9, 14, 19, 24],
            Self::Diagonal1 => [0, 6, 12, 18, 24],
            Self::Diagonal2 => [4, 8, 12, 16, 20],
        }
    }
}

/// Human-readable name, for announcements and logs.
impl fmt::Display for WinPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Row0 => "Top Row",
            Self::Row1 => "Second Row",
            Self::Row2 => "Middle Row",
            Self::Row3 => "Fourth Row",
            Self::Row4 => "Bottom Row",
            Self::Col0 => "Left Column",
            Self::Col1 => "Second Column",
            Self::Col2 => "Middle Column",
            Self::Col3 => "Fourth Column",
            Self::Col4 => "Right Column",
            Self::Diagonal1 => "Diagonal (Top-Left to Bottom-Right)",
            Self::Diagonal2 => "Diagonal (Top-Right to Bottom-Left)",
        };
        f.write_str(name)
    }
}

/// Returns `true` iff every tile of `pattern` counts as complete.
///
/// A tile counts when it is the FREE center, or when it is both revealed
/// (the server has announced its destination) and selected (the player has
/// marked it).
pub fn is_pattern_complete(
    pattern: WinPattern,
    selected: &[bool; BOARD_SIZE],
    revealed: &[bool; BOARD_SIZE],
) -> bool {
    pattern
        .positions()
        .into_iter()
        .all(|pos| pos == FREE_INDEX || (revealed[pos] && selected[pos]))
}

/// Returns every currently-complete pattern, in [`WinPattern::ALL`] order.
///
/// More than one pattern can complete at once (a row and a diagonal
/// sharing a tile, for example); callers that need a single pattern take
/// the first.
pub fn find_winning_patterns(
    selected: &[bool; BOARD_SIZE],
    revealed: &[bool; BOARD_SIZE],
) -> Vec<WinPattern> {
    WinPattern::ALL
        .into_iter()
        .filter(|&p| is_pattern_complete(p, selected, revealed))
        .collect()
}

/// Returns `true` iff at least one pattern is complete.
pub fn has_bingo(
    selected: &[bool; BOARD_SIZE],
    revealed: &[bool; BOARD_SIZE],
) -> bool {
    WinPattern::ALL
        .into_iter()
        .any(|p| is_pattern_complete(p, selected, revealed))
}

// =========================================================================
// Tests
// =========================================================================
