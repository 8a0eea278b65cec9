//! Error types for the protocol layer.

/// Errors that can occur while shaping or parsing wire messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed — malformed JSON, missing fields, or a
    /// payload that fails domain validation (bad board layout, bad code).
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// Input claiming to be a session code that isn't 6 chars of [A-Z0-9].
    #[error("invalid session code: {0:?}")]
    InvalidSessionCode(String),

    /// A message that parsed but violates protocol rules.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
