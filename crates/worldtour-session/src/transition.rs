//! The session lifecycle transition table.
//!
//! ```text
//! WAITING ──start──→ ACTIVE ──pause──→ PAUSED
//!    │                 │  ↑←──resume────┘ │
//!    └──end──→ ENDED ←─end────────────end─┘
//! ```
//!
//! [`apply`] is the single gate every control command passes through,
//! whatever transport delivered it. Authorization (is the caller the
//! owning host?) happens *before* this table is consulted; extra
//! preconditions (start needs a board, manual-reveal needs budget) happen
//! after.

use std::fmt;

use worldtour_protocol::SessionStatus;

use crate::GameError;

/// A host control command, as dispatched to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Start,
    Pause,
    Resume,
    End,
    ManualReveal,
}

impl fmt::Display for ControlCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Pause => "pause",
            Self::Resume => "resume",
            Self::End => "end",
            Self::ManualReveal => "manual-reveal",
        };
        f.write_str(s)
    }
}

/// Returns the status the session moves to when `command` is applied in
/// `from`, or [`GameError::InvalidTransition`] if that (state, command)
/// pair has no edge. The session state is untouched either way — the
/// caller commits the returned status along with the command's effects.
///
/// `manual-reveal` is a self-edge on ACTIVE: legal only there, and the
/// status does not change.
pub fn apply(
    from: SessionStatus,
    command: ControlCommand,
) -> Result<SessionStatus, GameError> {
    use ControlCommand as C;
    use SessionStatus as S;

    match (from, command) {
        (S::Waiting, C::Start) => Ok(S::Active),
        (S::Active, C::Pause) => Ok(S::Paused),
        (S::Paused, C::Resume) => Ok(S::Active),
        (S::Waiting | S::Active | S::Paused, C::End) => Ok(S::Ended),
        (S::Active, C::ManualReveal) => Ok(S::Active),
        _ => Err(GameError::InvalidTransition { from, command }),
    }
}
