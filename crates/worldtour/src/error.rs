//! Unified error type for the worldtour server.

use worldtour_protocol::ProtocolError;
use worldtour_session::GameError;
use worldtour_transport::TransportError;

/// Top-level error wrapping the layer-specific errors.
///
/// The `#[from]` conversions let `?` lift sub-crate errors automatically,
/// so server code deals with one type.
#[derive(Debug, thiserror::Error)]
pub enum WorldTourError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A game-level rejection (transition, authorization, claim).
    #[error(transparent)]
    Game(#[from] GameError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let top: WorldTourError = err.into();
        assert!(matches!(top, WorldTourError::Transport(_)));
        assert!(top.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let top: WorldTourError = err.into();
        assert!(matches!(top, WorldTourError::Protocol(_)));
    }

    #[test]
    fn test_from_game_error() {
        let err = GameError::NoLocationsRemaining;
        let top: WorldTourError = err.into();
        assert!(matches!(top, WorldTourError::Game(_)));
    }
}
