//! Error types for the session layer.

/// Errors that can occur while authenticating players.
///
/// Everything here maps to a client-visible rejection: the connection
/// handler turns these into `error` frames with a 401 code. None of
/// them touch game state.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Login was rejected. The message is deliberately vague about
    /// whether the name or the password was wrong; the distinction is
    /// logged server-side at debug level.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The presented token failed validation: bad signature, malformed
    /// claims, or a refresh token where an access token is required.
    #[error("invalid token: {0}")]
    TokenInvalid(String),

    /// The presented token's expiry has passed.
    #[error("token expired")]
    TokenExpired,

    /// Signing a new token failed. A server-side fault, not a client
    /// mistake; surfaces during login, never during verification.
    #[error("token creation failed: {0}")]
    TokenCreation(String),
}
