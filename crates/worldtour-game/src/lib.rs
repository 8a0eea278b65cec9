//! Board rules and win-pattern matching for BINGO World Tour.
//!
//! This is the referee of the game: the same functions run client-side for
//! instant feedback and server-side for authoritative claim validation, and
//! they must agree bit-for-bit. Everything here is a pure function over
//! plain data — no clocks, no randomness, no I/O.
//!
//! # Key types
//!
//! - [`WinPattern`] — the 12 five-tile lines that constitute a win
//! - [`BoardLayout`] — a validated 5×5 player board (24 destinations + FREE center)
//! - [`find_winning_patterns`] / [`has_bingo`] — the pattern matcher

mod board;
mod pattern;

pub use board::{BoardError, BoardLayout, Destination, DestinationId};
pub use pattern::{
    find_winning_patterns, has_bingo, is_pattern_complete, WinPattern,
};

/// Number of tiles on a board (5×5 grid, row-major).
pub const BOARD_SIZE: usize = 25;

/// Index of the FREE center tile (row 2, col 2). Always treated as both
/// revealed and selected; holds no destination.
pub const FREE_INDEX: usize = 12;
