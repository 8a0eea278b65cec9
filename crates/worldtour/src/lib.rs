//! # worldtour
//!
//! Realtime game server for BINGO World Tour convention sessions.
//!
//! The server is server-authoritative: hosts drive the session lifecycle
//! over the channel, the engine reveals destinations on a timer, and win
//! claims are re-validated against server state before a place is
//! awarded. This crate ties the layers together: transport → protocol →
//! session engine.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use worldtour::{WorldTourServer, SessionConfig};
//! use worldtour_protocol::PlayerId;
//! use worldtour_session::StaticCatalog;
//!
//! # struct MyAuth;
//! # impl worldtour_session::Authenticator for MyAuth {
//! #     async fn authenticate(&self, _t: &str)
//! #         -> Result<PlayerId, worldtour_session::GameError> {
//! #         Ok(PlayerId(1))
//! #     }
//! # }
//! # async fn run() -> Result<(), worldtour::WorldTourError> {
//! let server = WorldTourServer::<MyAuth, StaticCatalog>::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(MyAuth, Arc::new(StaticCatalog::default()))
//!     .await?;
//!
//! let handle = server
//!     .create_session(PlayerId(1), SessionConfig::default())
//!     .await?;
//! println!("session code: {}", handle.code());
//!
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::WorldTourError;
pub use server::{WorldTourServer, WorldTourServerBuilder};

// Re-export the surface most callers need alongside the server.
pub use worldtour_session::{
    Authenticator, Catalog, GameError, SessionConfig, SessionHandle,
    SessionRegistry,
};

/// Common imports for building on the worldtour server.
pub mod prelude {
    pub use crate::{
        Authenticator, Catalog, GameError, SessionConfig, SessionHandle,
        WorldTourError, WorldTourServer, WorldTourServerBuilder,
    };
    pub use worldtour_game::{
        BoardLayout, Destination, DestinationId, WinPattern, BOARD_SIZE,
        FREE_INDEX,
    };
    pub use worldtour_protocol::{
        ClientCommand, PlayerId, ServerEvent, SessionCode, SessionStatus,
    };
    pub use worldtour_session::{ControlCommand, StaticCatalog, Winner};
}
