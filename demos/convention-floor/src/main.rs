//! Demo server: a single BINGO World Tour session on a fixed catalog.
//!
//! Run it, note the session code it prints, and point WebSocket clients
//! at `ws://127.0.0.1:8080`. The first message must be
//! `{"type":"hello","code":"<CODE>","token":"<number>"}`; token `1` is
//! the host.
//!
//! ```sh
//! RUST_LOG=info cargo run -p convention-floor
//! ```

use std::sync::Arc;
use std::time::Duration;

use worldtour::prelude::*;

/// Accepts any numeric token as the player id. Demo only — production
/// wires [`Authenticator`] to the real identity provider.
struct DevAuthenticator;

impl Authenticator for DevAuthenticator {
    async fn authenticate(&self, token: &str) -> Result<PlayerId, GameError> {
        let id: u64 = token
            .parse()
            .map_err(|_| GameError::AuthFailed("token must be a number".into()))?;
        Ok(PlayerId(id))
    }
}

fn demo_catalog() -> StaticCatalog {
    let names = [
        "Kyoto", "Reykjavik", "Marrakech", "Cusco", "Queenstown",
        "Santorini", "Banff", "Hoi An", "Petra", "Zanzibar",
        "Lisbon", "Bora Bora", "Cape Town", "Havana", "Dubrovnik",
        "Kathmandu", "Tulum", "Edinburgh", "Luang Prabang", "Cartagena",
        "Seville", "Hallstatt", "Jaipur", "Bergen", "Valparaiso",
        "Tbilisi", "Oaxaca", "Ljubljana", "Hobart", "Essaouira",
    ];
    StaticCatalog::new(
        names
            .iter()
            .enumerate()
            .map(|(i, name)| Destination {
                id: DestinationId(i as u64 + 1),
                name: (*name).to_string(),
            })
            .collect(),
    )
}

#[tokio::main]
async fn main() -> Result<(), WorldTourError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let server = WorldTourServer::<DevAuthenticator, StaticCatalog>::builder()
        .bind("127.0.0.1:8080")
        .build(DevAuthenticator, Arc::new(demo_catalog()))
        .await?;

    let host = PlayerId(1);
    let session = server
        .create_session(
            host,
            SessionConfig {
                reveal_interval: Duration::from_secs(30),
                max_reveals: None,
            },
        )
        .await?;

    tracing::info!(
        code = %session.code(),
        addr = %server.local_addr().expect("bound").to_string(),
        "demo session ready — host token is 1"
    );

    server.run().await
}
