//! Session registry: creates, tracks, and looks up session actors.
//!
//! This is the one component that owns the process-wide collection of
//! live sessions. Nothing reaches a session except through a handle
//! obtained here, and the registry is passed into whatever serves
//! transports or admin endpoints as an explicit dependency — there is no
//! ambient global session table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use rand::Rng;

use worldtour_protocol::{PlayerId, SessionCode};

use crate::actor::spawn_session;
use crate::{
    Catalog, GameError, GameSession, SessionConfig, SessionHandle, SessionId,
};

/// Counter for generating unique session ids.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for session actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// Alphabet for session codes: uppercase letters and digits.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Manages all live sessions, keyed by their human-entry code.
pub struct SessionRegistry<C: Catalog> {
    sessions: HashMap<SessionCode, SessionHandle>,
    catalog: Arc<C>,
}

impl<C: Catalog> SessionRegistry<C> {
    /// Creates an empty registry reading from the given catalog.
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            sessions: HashMap::new(),
            catalog,
        }
    }

    /// Creates a new WAITING session owned by `host` and spawns its
    /// actor. The generated code is re-drawn until it collides with no
    /// live session. When the config leaves `max_reveals` unset, the
    /// ceiling defaults to the catalog size at this moment.
    pub async fn create(
        &mut self,
        host: PlayerId,
        config: SessionConfig,
    ) -> Result<SessionHandle, GameError> {
        let config = config.validated();

        let max_reveals = match config.max_reveals {
            Some(n) => n,
            None => self.catalog.destinations().await?.len() as u32,
        };

        let code = self.unique_code();
        let id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        let session = GameSession::new(
            id,
            code.clone(),
            host,
            config.reveal_interval,
            max_reveals,
        );

        let handle = spawn_session(
            session,
            Arc::clone(&self.catalog),
            DEFAULT_CHANNEL_SIZE,
        );
        self.sessions.insert(code.clone(), handle.clone());

        tracing::info!(
            session = %code,
            %id,
            %host,
            max_reveals,
            "session created"
        );
        Ok(handle)
    }

    /// Looks up a live session by code.
    pub fn lookup(
        &self,
        code: &SessionCode,
    ) -> Result<SessionHandle, GameError> {
        self.sessions
            .get(code)
            .cloned()
            .ok_or_else(|| GameError::SessionNotFound(code.clone()))
    }

    /// Shuts a session's actor down and forgets it. The code becomes
    /// available for reuse.
    pub async fn destroy(
        &mut self,
        code: &SessionCode,
    ) -> Result<(), GameError> {
        let handle = self
            .sessions
            .remove(code)
            .ok_or_else(|| GameError::SessionNotFound(code.clone()))?;

        let _ = handle.shutdown().await;
        tracing::info!(session = %code, "session destroyed");
        Ok(())
    }

    /// Number of live sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Codes of every live session.
    pub fn codes(&self) -> Vec<SessionCode> {
        self.sessions.keys().cloned().collect()
    }

    /// Draws codes until one is free. With 36^6 possibilities collisions
    /// are vanishingly rare; the loop is the correctness guarantee, not a
    /// hot path.
    fn unique_code(&self) -> SessionCode {
        loop {
            let code = generate_code();
            if !self.sessions.contains_key(&code) {
                return code;
            }
            tracing::debug!(session = %code, "session code collision, redrawing");
        }
    }
}

/// Generates a random 6-character code from `[A-Z0-9]`.
fn generate_code() -> SessionCode {
    let mut rng = rand::rng();
    let code: String = (0..worldtour_protocol::CODE_LEN)
        .map(|_| {
            let i = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[i] as char
        })
        .collect();
    code.parse().expect("generated code is always well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_code_is_well_formed() {
        for _ in 0..100 {
            let code = generate_code();
            assert_eq!(code.as_str().len(), worldtour_protocol::CODE_LEN);
            assert!(code
                .as_str()
                .bytes()
                .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit()));
        }
    }
}
