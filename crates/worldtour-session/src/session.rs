//! The session record: identity, configuration, and lifecycle fields.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use worldtour_protocol::{PlayerId, SessionCode, SessionStatus};

/// A unique identifier for a game session. The human-entry
/// [`SessionCode`] is what players type; this is what logs and
/// collaborators key on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// One hosted game of BINGO World Tour.
///
/// Owned exclusively by the session's actor task; everything else sees it
/// through [`SessionInfo`](crate::SessionInfo) snapshots. The invariants
/// (`current_reveal_index <= max_reveals`, status only moves along the
/// transition table's edges) are maintained by the actor, which is the
/// only writer.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: SessionId,
    pub code: SessionCode,
    /// The creating host — the only identity allowed to issue control
    /// commands.
    pub host: PlayerId,
    pub status: SessionStatus,
    pub reveal_interval: Duration,
    pub max_reveals: u32,
    /// Count of reveals issued so far. Monotonic; always equals the
    /// length of the reveal history.
    pub current_reveal_index: u32,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl GameSession {
    /// Creates a fresh WAITING session.
    pub fn new(
        id: SessionId,
        code: SessionCode,
        host: PlayerId,
        reveal_interval: Duration,
        max_reveals: u32,
    ) -> Self {
        Self {
            id,
            code,
            host,
            status: SessionStatus::Waiting,
            reveal_interval,
            max_reveals,
            current_reveal_index: 0,
            created_at: Utc::now(),
            started_at: None,
            ended_at: None,
        }
    }

    /// Whether the reveal budget still has room.
    pub fn reveals_remaining(&self) -> bool {
        self.current_reveal_index < self.max_reveals
    }
}

/// A point-in-time snapshot of session metadata, for status endpoints and
/// admin dashboards. Not the game state itself — boards and reveal
/// history travel separately.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub id: SessionId,
    pub code: SessionCode,
    pub host: PlayerId,
    pub status: SessionStatus,
    pub reveal_interval: Duration,
    pub max_reveals: u32,
    pub current_reveal_index: u32,
    /// Players with a board in this session.
    pub player_count: usize,
    /// Currently connected channel participants.
    pub connection_count: usize,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
}
