//! Message and identity types for the session channel.
//!
//! The wire format is flat, internally tagged JSON — the exact shape the
//! browser client already speaks: `{"type": "location-revealed", ...}`.
//! Field names are camelCase on the wire; variant tags are kebab-case.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use worldtour_game::{
    BoardLayout, DestinationId, WinPattern, BOARD_SIZE,
};

use crate::ProtocolError;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player (or host — hosts are players who own
/// a session).
///
/// Newtype over the id the external identity provider assigns, so a
/// `PlayerId` can never be confused with a [`DestinationId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Length of a session code.
pub const CODE_LEN: usize = 6;

/// A human-entry session code: exactly 6 characters from `[A-Z0-9]`.
///
/// Construction validates the format, so any `SessionCode` in the system
/// is well-formed; external input claiming to be a code must pass through
/// [`SessionCode::from_str`] (or serde, which routes through it) before it
/// can reach a lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionCode(String);

impl SessionCode {
    /// The code as text, e.g. `"K7Q2ZD"`.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SessionCode {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = s.len() == CODE_LEN
            && s.bytes().all(|b| b.is_ascii_uppercase() || b.is_ascii_digit());
        if valid {
            Ok(Self(s.to_owned()))
        } else {
            Err(ProtocolError::InvalidSessionCode(s.to_owned()))
        }
    }
}

impl TryFrom<String> for SessionCode {
    type Error = ProtocolError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SessionCode> for String {
    fn from(code: SessionCode) -> Self {
        code.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

/// The lifecycle state of a game session.
///
/// ```text
/// WAITING → ACTIVE ⇄ PAUSED
///    │         │        │
///    └────────→ ENDED ←─┘
/// ```
///
/// STARTING is reserved for a pre-game countdown; in the current design
/// start goes directly WAITING → ACTIVE and nothing transitions into it.
/// The legal edges themselves live in the session engine's transition
/// table — this type only names the states and their wire spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Waiting,
    Starting,
    Active,
    Paused,
    Ended,
}

impl SessionStatus {
    /// Returns `true` if players may still join (boards may be created).
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` while the game is underway (reveals happening or
    /// merely suspended).
    pub fn is_live(&self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }

    /// Returns `true` once the session can never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Waiting => "WAITING",
            Self::Starting => "STARTING",
            Self::Active => "ACTIVE",
            Self::Paused => "PAUSED",
            Self::Ended => "ENDED",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Revealed-location record
// ---------------------------------------------------------------------------

/// One entry of a session's reveal history, as sent in the connect-time
/// snapshot. `reveal_index` is 1-based and contiguous within a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealedLocation {
    pub destination_id: DestinationId,
    pub destination_name: String,
    pub reveal_index: u32,
    pub revealed_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Client → server commands
// ---------------------------------------------------------------------------

/// Everything a connected participant may send on a session channel.
///
/// Host-only control commands (start, pause, resume, end, manual-reveal)
/// pass through the same authorization gate regardless of transport — the
/// channel is an adapter, not a second source of truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientCommand {
    /// Must be the first message on a fresh connection: which session
    /// this connection belongs to, and who is speaking. `code` stays a
    /// raw string here so the server can validate the 6-char [A-Z0-9]
    /// format itself and answer with a proper error instead of a decode
    /// failure.
    Hello {
        code: String,
        #[serde(default)]
        token: Option<String>,
    },

    /// Keep-alive; answered with [`ServerEvent::Pong`] to the sender only.
    Ping,

    /// Join a WAITING session with a completed board layout.
    /// The layout is validated during decode (exactly 24 destinations,
    /// empty center, no duplicates).
    Join {
        #[serde(rename = "boardLayout")]
        board_layout: BoardLayout,
    },

    /// Host: WAITING → ACTIVE; begins the reveal schedule.
    Start,

    /// Host: ACTIVE → PAUSED; suspends the reveal schedule.
    Pause,

    /// Host: PAUSED → ACTIVE; restarts a full reveal interval.
    Resume,

    /// Host: end the session from any non-terminal state.
    End,

    /// Host: perform one reveal immediately, consuming a schedule slot.
    ManualReveal,

    /// Claim a bingo. `selected_tiles` is the claimant's own marking;
    /// the revealed side is recomputed server-side and never trusted.
    ClaimBingo {
        #[serde(rename = "winningPattern")]
        winning_pattern: WinPattern,
        #[serde(rename = "selectedTiles")]
        selected_tiles: [bool; BOARD_SIZE],
    },
}

// ---------------------------------------------------------------------------
// Server → client events
// ---------------------------------------------------------------------------

/// Everything the server may deliver on a session channel.
///
/// Broadcast events go to every connected participant of the session;
/// `connected`, `board-accepted`, `pong`, and `error` go only to the
/// participant they concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Connect-time snapshot: current status plus the full reveal history,
    /// in reveal order. Late joiners and reconnecting clients resync from
    /// this instead of relying on replay.
    Connected {
        status: SessionStatus,
        #[serde(rename = "revealedLocations")]
        revealed_locations: Vec<RevealedLocation>,
    },

    /// A destination was just announced as in play.
    LocationRevealed {
        #[serde(rename = "destinationId")]
        destination_id: DestinationId,
        #[serde(rename = "destinationName")]
        destination_name: String,
        #[serde(rename = "revealIndex")]
        reveal_index: u32,
    },

    GamePaused,
    GameResumed,
    GameEnded,

    /// A claim was accepted; `place` is 1-based arrival order of
    /// validated claims.
    WinnerFound {
        #[serde(rename = "playerId")]
        player_id: PlayerId,
        place: u32,
    },

    /// The sender's board was created; the session still shows WAITING.
    BoardAccepted,

    /// Something the *sender* did was rejected. Never broadcast.
    Error { message: String },

    /// Answer to [`ClientCommand::Ping`].
    Pong,
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client parses these shapes verbatim, so the serde
    //! attributes are load-bearing: a tag or casing mismatch breaks every
    //! connected player at once.

    use super::*;
    use worldtour_game::FREE_INDEX;

    fn sample_layout() -> BoardLayout {
        let mut slots = [None; BOARD_SIZE];
        let mut next = 1;
        for (i, slot) in slots.iter_mut().enumerate() {
            if i != FREE_INDEX {
                *slot = Some(DestinationId(next));
                next += 1;
            }
        }
        BoardLayout::new(slots).unwrap()
    }

    // =====================================================================
    // SessionCode
    // =====================================================================

    #[test]
    fn test_session_code_accepts_uppercase_alphanumeric() {
        let code: SessionCode = "K7Q2ZD".parse().unwrap();
        assert_eq!(code.as_str(), "K7Q2ZD");
    }

    #[test]
    fn test_session_code_rejects_wrong_length() {
        assert!("ABCDE".parse::<SessionCode>().is_err());
        assert!("ABCDEFG".parse::<SessionCode>().is_err());
        assert!("".parse::<SessionCode>().is_err());
    }

    #[test]
    fn test_session_code_rejects_lowercase_and_symbols() {
        assert!("abc123".parse::<SessionCode>().is_err());
        assert!("AB-123".parse::<SessionCode>().is_err());
        assert!("AB 123".parse::<SessionCode>().is_err());
    }

    #[test]
    fn test_session_code_serializes_as_plain_string() {
        let code: SessionCode = "AAAAAA".parse().unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"AAAAAA\"");
    }

    #[test]
    fn test_session_code_deserialization_validates() {
        let result: Result<SessionCode, _> =
            serde_json::from_str("\"nope!!\"");
        assert!(result.is_err());
    }

    // =====================================================================
    // SessionStatus
    // =====================================================================

    #[test]
    fn test_session_status_wire_spelling_is_uppercase() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Waiting).unwrap(),
            "\"WAITING\""
        );
        assert_eq!(
            serde_json::to_string(&SessionStatus::Active).unwrap(),
            "\"ACTIVE\""
        );
        let s: SessionStatus = serde_json::from_str("\"PAUSED\"").unwrap();
        assert_eq!(s, SessionStatus::Paused);
    }

    #[test]
    fn test_session_status_predicates() {
        assert!(SessionStatus::Waiting.is_joinable());
        assert!(!SessionStatus::Active.is_joinable());

        assert!(SessionStatus::Active.is_live());
        assert!(SessionStatus::Paused.is_live());
        assert!(!SessionStatus::Waiting.is_live());
        assert!(!SessionStatus::Ended.is_live());

        assert!(SessionStatus::Ended.is_terminal());
        assert!(!SessionStatus::Paused.is_terminal());
    }

    // =====================================================================
    // ClientCommand
    // =====================================================================

    #[test]
    fn test_client_command_hello_json_format() {
        let cmd = ClientCommand::Hello {
            code: "K7Q2ZD".into(),
            token: Some("abc".into()),
        };
        let json = serde_json::to_value(&cmd).unwrap();
        assert_eq!(json["type"], "hello");
        assert_eq!(json["code"], "K7Q2ZD");
        assert_eq!(json["token"], "abc");
    }

    #[test]
    fn test_client_command_hello_token_optional() {
        let json = r#"{"type": "hello", "code": "AAAAAA", "token": null}"#;
        let cmd: ClientCommand = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            ClientCommand::Hello {
                code: "AAAAAA".into(),
                token: None,
            }
        );
    }

    #[test]
    fn test_client_command_tags_are_kebab_case() {
        let json = serde_json::to_value(&ClientCommand::ManualReveal).unwrap();
        assert_eq!(json["type"], "manual-reveal");

        let json = serde_json::to_value(&ClientCommand::Ping).unwrap();
        assert_eq!(json["type"], "ping");
    }

    #[test]
    fn test_client_command_claim_bingo_json_format() {
        let cmd = ClientCommand::ClaimBingo {
            winning_pattern: WinPattern::Row0,
            selected_tiles: [true; BOARD_SIZE],
        };
        let json = serde_json::to_value(&cmd).unwrap();

        assert_eq!(json["type"], "claim-bingo");
        assert_eq!(json["winningPattern"], "row-0");
        assert_eq!(
            json["selectedTiles"].as_array().unwrap().len(),
            BOARD_SIZE
        );
    }

    #[test]
    fn test_client_command_claim_bingo_wrong_tile_count_rejected() {
        let json = r#"{
            "type": "claim-bingo",
            "winningPattern": "row-0",
            "selectedTiles": [true, false]
        }"#;
        let result: Result<ClientCommand, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_command_join_round_trip() {
        let cmd = ClientCommand::Join {
            board_layout: sample_layout(),
        };
        let bytes = serde_json::to_vec(&cmd).unwrap();
        let decoded: ClientCommand = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(cmd, decoded);
    }

    #[test]
    fn test_client_command_join_invalid_board_rejected_at_decode() {
        // A join whose layout occupies the FREE center never reaches the
        // engine — the decode itself fails.
        let mut slots = vec![Some(DestinationId(1)); BOARD_SIZE];
        slots[FREE_INDEX] = Some(DestinationId(99));
        let json = serde_json::json!({
            "type": "join",
            "boardLayout": slots,
        });
        let result: Result<ClientCommand, _> =
            serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_client_command_control_round_trips() {
        for cmd in [
            ClientCommand::Start,
            ClientCommand::Pause,
            ClientCommand::Resume,
            ClientCommand::End,
            ClientCommand::ManualReveal,
        ] {
            let bytes = serde_json::to_vec(&cmd).unwrap();
            let decoded: ClientCommand =
                serde_json::from_slice(&bytes).unwrap();
            assert_eq!(cmd, decoded);
        }
    }

    #[test]
    fn test_client_command_unknown_type_rejected() {
        let result: Result<ClientCommand, _> =
            serde_json::from_str(r#"{"type": "fly-to-moon"}"#);
        assert!(result.is_err());
    }

    // =====================================================================
    // ServerEvent
    // =====================================================================

    #[test]
    fn test_server_event_connected_json_format() {
        let event = ServerEvent::Connected {
            status: SessionStatus::Active,
            revealed_locations: vec![RevealedLocation {
                destination_id: DestinationId(4),
                destination_name: "Kyoto".into(),
                reveal_index: 1,
                revealed_at: Utc::now(),
            }],
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "connected");
        assert_eq!(json["status"], "ACTIVE");
        assert_eq!(json["revealedLocations"][0]["destinationName"], "Kyoto");
        assert_eq!(json["revealedLocations"][0]["revealIndex"], 1);
    }

    #[test]
    fn test_server_event_location_revealed_json_format() {
        let event = ServerEvent::LocationRevealed {
            destination_id: DestinationId(9),
            destination_name: "Reykjavik".into(),
            reveal_index: 3,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "location-revealed");
        assert_eq!(json["destinationId"], 9);
        assert_eq!(json["destinationName"], "Reykjavik");
        assert_eq!(json["revealIndex"], 3);
    }

    #[test]
    fn test_server_event_unit_variants_are_bare_tags() {
        assert_eq!(
            serde_json::to_string(&ServerEvent::GamePaused).unwrap(),
            r#"{"type":"game-paused"}"#
        );
        assert_eq!(
            serde_json::to_string(&ServerEvent::GameEnded).unwrap(),
            r#"{"type":"game-ended"}"#
        );
        assert_eq!(
            serde_json::to_string(&ServerEvent::Pong).unwrap(),
            r#"{"type":"pong"}"#
        );
    }

    #[test]
    fn test_server_event_winner_found_json_format() {
        let event = ServerEvent::WinnerFound {
            player_id: PlayerId(42),
            place: 2,
        };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "winner-found");
        assert_eq!(json["playerId"], 42);
        assert_eq!(json["place"], 2);
    }

    #[test]
    fn test_server_event_error_round_trip() {
        let event = ServerEvent::Error {
            message: "not your session".into(),
        };
        let bytes = serde_json::to_vec(&event).unwrap();
        let decoded: ServerEvent = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }
}
