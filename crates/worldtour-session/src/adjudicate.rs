//! Server-authoritative win adjudication.
//!
//! A claim carries the player's own tile marking and the pattern they
//! believe is complete. The revealed side of the check is *recomputed
//! here* from the session's reveal history and the claimant's stored
//! board — the client's opinion of what has been revealed never enters
//! the computation. This is the single defense against a client lying
//! about reveals to force a false win.

use worldtour_game::{find_winning_patterns, WinPattern, BOARD_SIZE};
use worldtour_protocol::{PlayerId, SessionStatus};

use crate::{GameError, SessionStore};

/// Rejection reason when no pattern is complete at all.
pub(crate) const NOT_COMPLETE: &str = "pattern not complete";
/// Rejection reason when some pattern is complete but not the claimed one.
pub(crate) const PATTERN_MISMATCH: &str = "pattern does not match";

/// Validates a win claim against authoritative state.
///
/// Read-only: the caller records the winner (and assigns the place) in
/// the same actor turn on success, which is what keeps place assignment
/// gapless under concurrent claims.
///
/// Checks, in order:
/// 1. session is ACTIVE
/// 2. claimant has a board
/// 3. claimant has not already won
/// 4. the claimed pattern is among the patterns actually complete given
///    the claimant's marking and the server-side revealed mask
///
/// A destination revealed but absent from the claimant's board has no
/// effect on that board — only the claimant's own 24 placed destinations
/// count.
pub fn adjudicate(
    status: SessionStatus,
    store: &SessionStore,
    claimant: PlayerId,
    claimed: WinPattern,
    selected: &[bool; BOARD_SIZE],
) -> Result<WinPattern, GameError> {
    if status != SessionStatus::Active {
        return Err(GameError::NotActive);
    }

    let board = store
        .board(claimant)
        .ok_or(GameError::BoardNotFound(claimant))?;

    if store.has_won(claimant) {
        return Err(GameError::AlreadyWon(claimant));
    }

    let revealed = board.revealed_mask(store.revealed_ids());
    let complete = find_winning_patterns(selected, &revealed);

    if complete.is_empty() {
        return Err(GameError::InvalidBingo(NOT_COMPLETE));
    }
    if !complete.contains(&claimed) {
        return Err(GameError::InvalidBingo(PATTERN_MISMATCH));
    }

    Ok(claimed)
}

// =========================================================================
// Tests
// =========================================================================
