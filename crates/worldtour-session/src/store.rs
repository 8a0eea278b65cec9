//! Per-session game state: boards, reveal history, winners.
//!
//! # Concurrency note
//!
//! `SessionStore` is NOT thread-safe by itself — plain maps and vectors,
//! no locks. This is intentional: the store is owned by exactly one
//! session actor task and mutated only from there, which is what makes
//! the reveal append and the count-then-insert place assignment atomic
//! without any locking here.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use worldtour_game::{BoardLayout, Destination, DestinationId, WinPattern};
use worldtour_protocol::{PlayerId, RevealedLocation};

/// An accepted win claim. `place` is 1-based and assigned by the arrival
/// order of *validated* claims, not by completion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub player: PlayerId,
    pub win_pattern: WinPattern,
    pub place: u32,
    pub won_at: DateTime<Utc>,
}

/// All mutable game state of one session except the session record
/// itself.
#[derive(Debug, Default)]
pub struct SessionStore {
    /// One board per player — the (player, session) uniqueness invariant,
    /// with this store scoped to a single session.
    boards: HashMap<PlayerId, BoardLayout>,
    /// Reveal history in reveal order; `reveal_index` values are exactly
    /// `1..=len`, no gaps, no duplicates.
    revealed: Vec<RevealedLocation>,
    /// Same destinations as `revealed`, for O(1) membership checks.
    revealed_ids: HashSet<DestinationId>,
    /// Accepted winners in place order.
    winners: Vec<Winner>,
    won: HashSet<PlayerId>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -- Boards -----------------------------------------------------------

    /// Inserts or replaces a player's board. Returns `true` if an earlier
    /// board was replaced (re-join while WAITING is delete-and-recreate).
    /// The caller enforces that the session is still joinable.
    pub fn put_board(
        &mut self,
        player: PlayerId,
        layout: BoardLayout,
    ) -> bool {
        self.boards.insert(player, layout).is_some()
    }

    pub fn board(&self, player: PlayerId) -> Option<&BoardLayout> {
        self.boards.get(&player)
    }

    pub fn board_count(&self) -> usize {
        self.boards.len()
    }

    // -- Reveals ----------------------------------------------------------

    /// Appends one reveal to the history.
    ///
    /// # Panics
    /// In debug builds, if `reveal_index` is not the next contiguous
    /// index or the destination was already revealed — both would mean
    /// the actor's serialization guarantee has been broken.
    pub fn record_reveal(
        &mut self,
        destination: &Destination,
        reveal_index: u32,
    ) {
        debug_assert_eq!(reveal_index as usize, self.revealed.len() + 1);
        debug_assert!(!self.revealed_ids.contains(&destination.id));

        self.revealed_ids.insert(destination.id);
        self.revealed.push(RevealedLocation {
            destination_id: destination.id,
            destination_name: destination.name.clone(),
            reveal_index,
            revealed_at: Utc::now(),
        });
    }

    pub fn is_revealed(&self, id: DestinationId) -> bool {
        self.revealed_ids.contains(&id)
    }

    /// The full reveal history, in reveal order.
    pub fn revealed(&self) -> &[RevealedLocation] {
        &self.revealed
    }

    pub fn revealed_ids(&self) -> &HashSet<DestinationId> {
        &self.revealed_ids
    }

    pub fn reveal_count(&self) -> u32 {
        self.revealed.len() as u32
    }

    // -- Winners ----------------------------------------------------------

    pub fn has_won(&self, player: PlayerId) -> bool {
        self.won.contains(&player)
    }

    /// Records an accepted claim, assigning the next place
    /// (count-then-insert). The caller adjudicates first; this only
    /// appends.
    pub fn record_winner(
        &mut self,
        player: PlayerId,
        win_pattern: WinPattern,
    ) -> Winner {
        debug_assert!(!self.won.contains(&player));

        let winner = Winner {
            player,
            win_pattern,
            place: self.winners.len() as u32 + 1,
            won_at: Utc::now(),
        };
        self.won.insert(player);
        self.winners.push(winner.clone());
        winner
    }

    /// Accepted winners in place order.
    pub fn winners(&self) -> &[Winner] {
        &self.winners
    }
}

// =========================================================================
// Tests
// =========================================================================
