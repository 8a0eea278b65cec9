//! Authentication hook for resolving caller identity.
//!
//! The engine never validates credentials itself — identity is the
//! hosting app's (or its auth provider's) problem. This trait is the
//! seam: the connection handler passes the token it received, and the
//! implementation returns who that is. Production wires this to the
//! identity provider; tests and demos use a permissive stand-in.

use worldtour_protocol::PlayerId;

use crate::GameError;

/// Validates a client's auth token and returns their identity.
///
/// # Example
///
/// ```rust
/// use worldtour_session::{Authenticator, GameError};
/// use worldtour_protocol::PlayerId;
///
/// /// Accepts any numeric token as the player id. Development only.
/// struct DevAuthenticator;
///
/// impl Authenticator for DevAuthenticator {
///     async fn authenticate(
///         &self,
///         token: &str,
///     ) -> Result<PlayerId, GameError> {
///         let id: u64 = token.parse().map_err(|_| {
///             GameError::AuthFailed("token must be a number".into())
///         })?;
///         Ok(PlayerId(id))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Resolves `token` to a player identity, or
    /// [`GameError::AuthFailed`] if it is invalid, expired, or unknown.
    fn authenticate(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerId, GameError>> + Send;
}
