//! `WorldTourServer` builder and accept loop.
//!
//! The entry point for running the game server. It owns the transport
//! and the session registry, and spawns one handler task per accepted
//! connection.

use std::sync::Arc;

use tokio::sync::Mutex;

use worldtour_protocol::{JsonCodec, PlayerId};
use worldtour_session::{
    Authenticator, Catalog, SessionConfig, SessionHandle, SessionRegistry,
};
use worldtour_transport::{Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::WorldTourError;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<A: Authenticator, C: Catalog> {
    pub(crate) registry: Mutex<SessionRegistry<C>>,
    pub(crate) auth: A,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a worldtour server.
pub struct WorldTourServerBuilder {
    bind_addr: String,
}

impl WorldTourServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Binds the transport and assembles the server.
    ///
    /// `auth` resolves connection tokens to player identities;
    /// `catalog` is the destination catalog sessions reveal from.
    pub async fn build<A: Authenticator, C: Catalog>(
        self,
        auth: A,
        catalog: Arc<C>,
    ) -> Result<WorldTourServer<A, C>, WorldTourError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            registry: Mutex::new(SessionRegistry::new(catalog)),
            auth,
            codec: JsonCodec,
        });

        Ok(WorldTourServer { transport, state })
    }
}

impl Default for WorldTourServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running worldtour game server.
///
/// Sessions are created through [`create_session`](Self::create_session)
/// (the admin surface calls this); participants reach them over the
/// WebSocket channel once [`run`](Self::run) is accepting.
pub struct WorldTourServer<A: Authenticator, C: Catalog> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, C>>,
}

impl<A: Authenticator, C: Catalog> WorldTourServer<A, C> {
    /// Creates a new builder.
    pub fn builder() -> WorldTourServerBuilder {
        WorldTourServerBuilder::new()
    }

    /// The local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Creates a new session owned by `host` and returns its handle
    /// (the code is on the handle).
    pub async fn create_session(
        &self,
        host: PlayerId,
        config: SessionConfig,
    ) -> Result<SessionHandle, WorldTourError> {
        let mut registry = self.state.registry.lock().await;
        Ok(registry.create(host, config).await?)
    }

    /// Runs the accept loop: each incoming connection gets its own
    /// handler task. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), WorldTourError> {
        tracing::info!("worldtour server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection::<A, C>(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
