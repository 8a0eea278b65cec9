//! Codec trait and implementations.
//!
//! The channel layer doesn't care how messages become bytes — anything
//! implementing [`Codec`] will do. [`JsonCodec`] is the default (and what
//! the browser client speaks); a binary codec could be added behind
//! another feature without touching the rest of the stack.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Converts message types to and from raw bytes.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// truncated, or don't match the expected shape.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ## Example
///
/// ```rust
/// use worldtour_protocol::{Codec, JsonCodec, ClientCommand};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&ClientCommand::Ping).unwrap();
/// let decoded: ClientCommand = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, ClientCommand::Ping);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
