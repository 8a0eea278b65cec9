//! Error taxonomy for the session engine.
//!
//! Every variant is a caller-facing rejection: it is reported to the
//! participant whose action triggered it and never crashes the session
//! actor or leaks to other participants.

use worldtour_game::BoardError;
use worldtour_protocol::{PlayerId, SessionCode, SessionStatus};

use crate::catalog::CatalogError;
use crate::transition::ControlCommand;

/// Errors that can occur during session operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The command is not legal from the session's current state.
    #[error("cannot {command} a session that is {from}")]
    InvalidTransition {
        from: SessionStatus,
        command: ControlCommand,
    },

    /// A host-only command from someone who is not the owning host.
    #[error("player {0} is not the host of this session")]
    Unauthorized(PlayerId),

    /// The caller's token did not resolve to an identity.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// Every catalog destination has already been revealed.
    #[error("no unrevealed destinations remain")]
    NoLocationsRemaining,

    /// The reveal budget is spent; the slot this reveal wanted was
    /// already consumed.
    #[error("maximum of {0} reveals already reached")]
    MaxRevealsReached(u32),

    /// Starting requires at least one player board.
    #[error("cannot start a session with no player boards")]
    NoBoards,

    /// Boards can only be created or replaced while the session is
    /// WAITING.
    #[error("session is not accepting players (status {0})")]
    NotJoinable(SessionStatus),

    /// Claims are only adjudicated while the game is ACTIVE.
    #[error("game is not active")]
    NotActive,

    /// The claimant has no board in this session.
    #[error("player {0} has no board in this session")]
    BoardNotFound(PlayerId),

    /// The claimant already holds a place in this session.
    #[error("player {0} has already won this session")]
    AlreadyWon(PlayerId),

    /// The claim failed server-side re-validation. The embedded reason is
    /// one of a fixed set of strings, so resubmitting the same bad claim
    /// yields the same rejection.
    #[error("invalid bingo: {0}")]
    InvalidBingo(&'static str),

    /// No session exists for this code.
    #[error("session {0} not found")]
    SessionNotFound(SessionCode),

    /// The session actor's command channel is closed.
    #[error("session {0} is unavailable")]
    Unavailable(SessionCode),

    /// A submitted board layout failed validation.
    #[error("invalid board: {0}")]
    Board(#[from] BoardError),

    /// The destination catalog could not be read.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
