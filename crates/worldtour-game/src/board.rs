//! Player boards: a validated 5×5 layout of destinations.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{BOARD_SIZE, FREE_INDEX};

/// A unique identifier for a destination in the travel catalog.
///
/// The catalog itself (names, descriptions, imagery) is managed elsewhere;
/// boards and reveal history only ever hold this reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationId(pub u64);

impl fmt::Display for DestinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "D-{}", self.0)
    }
}

/// A catalog entry as the game needs it: the reference plus the display
/// name announced with each reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub id: DestinationId,
    pub name: String,
}

/// Errors from board layout validation.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BoardError {
    /// The layout does not have exactly 25 slots.
    #[error("board must have {BOARD_SIZE} slots, got {0}")]
    WrongLength(usize),

    /// The center slot must stay empty — it is the FREE tile.
    #[error("center slot is reserved for the FREE tile")]
    CenterOccupied,

    /// A playable board needs exactly 24 placed destinations.
    #[error("board must place exactly 24 destinations, got {0}")]
    WrongDestinationCount(usize),

    /// The same destination appears in more than one slot.
    #[error("destination {0} appears more than once")]
    DuplicateDestination(DestinationId),
}

/// A player's 5×5 board: 24 chosen destinations around a FREE center.
///
/// Construction validates the §3 invariants, so holding a `BoardLayout`
/// means the layout is playable. Boards are immutable once a session
/// starts; re-joining a WAITING session replaces the board wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Option<DestinationId>>",
    into = "Vec<Option<DestinationId>>"
)]
pub struct BoardLayout {
    slots: [Option<DestinationId>; BOARD_SIZE],
}

impl BoardLayout {
    /// Validates and wraps a 25-slot layout.
    ///
    /// # Errors
    /// - [`BoardError::CenterOccupied`] if slot 12 holds a destination
    /// - [`BoardError::WrongDestinationCount`] unless exactly 24 slots are filled
    /// - [`BoardError::DuplicateDestination`] if any reference repeats
    pub fn new(
        slots: [Option<DestinationId>; BOARD_SIZE],
    ) -> Result<Self, BoardError> {
        if slots[FREE_INDEX].is_some() {
            return Err(BoardError::CenterOccupied);
        }

        let placed = slots.iter().flatten().count();
        if placed != BOARD_SIZE - 1 {
            return Err(BoardError::WrongDestinationCount(placed));
        }

        let mut seen = HashSet::with_capacity(BOARD_SIZE - 1);
        for id in slots.iter().flatten() {
            if !seen.insert(*id) {
                return Err(BoardError::DuplicateDestination(*id));
            }
        }

        Ok(Self { slots })
    }

    /// The raw slots, row-major. Slot 12 is always `None`.
    pub fn slots(&self) -> &[Option<DestinationId>; BOARD_SIZE] {
        &self.slots
    }

    /// Whether this board contains the given destination.
    pub fn contains(&self, id: DestinationId) -> bool {
        self.slots.iter().flatten().any(|&d| d == id)
    }

    /// Computes the authoritative revealed mask for this board: a slot is
    /// revealed iff its destination is in the session's revealed set. The
    /// FREE center is always revealed.
    ///
    /// This is the server-side truth the adjudicator matches against —
    /// never the client's claim about what has been revealed.
    pub fn revealed_mask(
        &self,
        revealed: &HashSet<DestinationId>,
    ) -> [bool; BOARD_SIZE] {
        let mut mask = [false; BOARD_SIZE];
        for (i, slot) in self.slots.iter().enumerate() {
            mask[i] = match slot {
                Some(id) => revealed.contains(id),
                None => i == FREE_INDEX,
            };
        }
        mask
    }
}

impl TryFrom<Vec<Option<DestinationId>>> for BoardLayout {
    type Error = BoardError;

    fn try_from(value: Vec<Option<DestinationId>>) -> Result<Self, BoardError> {
        let len = value.len();
        let slots: [Option<DestinationId>; BOARD_SIZE] = value
            .try_into()
            .map_err(|_| BoardError::WrongLength(len))?;
        Self::new(slots)
    }
}

impl From<BoardLayout> for Vec<Option<DestinationId>> {
    fn from(layout: BoardLayout) -> Self {
        layout.slots.to_vec()
    }
}

// =========================================================================
// Tests
// =========================================================================
