//! Session lifecycle, reveal engine, and win adjudication for BINGO
//! World Tour.
//!
//! Each game session runs as an isolated Tokio task (actor model) that
//! owns every piece of mutable session state: the status machine, the
//! board/reveal/winner store, and the reveal timer. All operations —
//! host control commands, board joins, win claims, connection fan-out —
//! are messages into that task, so the command channel *is* the
//! per-session critical section: a pause can never interleave with a
//! reveal, and two claims can never race for the same place.
//!
//! # Key types
//!
//! - [`SessionRegistry`] — creates/destroys sessions, looks them up by code
//! - [`SessionHandle`] — send commands to a running session actor
//! - [`GameSession`] — the session record (status, counters, timestamps)
//! - [`transition`] — the legal lifecycle edges
//! - [`adjudicate`] — server-authoritative claim validation
//! - [`Authenticator`] / [`Catalog`] — the seams to the identity provider
//!   and the destination catalog, both managed outside this engine

#![allow(async_fn_in_trait)]

mod actor;
mod adjudicate;
mod auth;
mod catalog;
mod config;
mod error;
mod registry;
mod session;
mod store;
pub mod transition;

pub use actor::{ParticipantId, ParticipantSender, SessionHandle};
pub use adjudicate::adjudicate;
pub use auth::Authenticator;
pub use catalog::{Catalog, CatalogError, StaticCatalog};
pub use config::SessionConfig;
pub use error::GameError;
pub use registry::SessionRegistry;
pub use session::{GameSession, SessionId, SessionInfo};
pub use store::{SessionStore, Winner};
pub use transition::ControlCommand;
