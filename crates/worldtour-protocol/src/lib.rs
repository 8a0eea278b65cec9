//! Wire protocol for BINGO World Tour.
//!
//! This crate defines the language the browser client and the game server
//! speak over a session's realtime channel:
//!
//! - **Types** ([`ClientCommand`], [`ServerEvent`], [`SessionCode`],
//!   [`SessionStatus`], …) — the message structures on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while doing so.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and the session
//! engine (game state). It knows nothing about connections or sessions —
//! only how messages are shaped and serialized.
//!
//! ```text
//! Transport (frames) → Protocol (commands/events) → Session engine
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientCommand, PlayerId, RevealedLocation, ServerEvent, SessionCode,
    SessionStatus, CODE_LEN,
};
