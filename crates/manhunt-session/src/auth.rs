//! Authentication hook for establishing player identity.
//!
//! The connection handler doesn't care how identity is established; it
//! calls through the [`Authenticator`] trait with whatever the client
//! sent as its first frame. The shipped implementation,
//! [`TokenAuthenticator`], combines the credential registry with the
//! token issuer; tests substitute stubs.

use manhunt_protocol::PlayerId;

use crate::{CredentialRegistry, SessionError, TokenIssuer};

/// What a successful login hands back to the client.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub player_id: PlayerId,
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of the access token, seconds since the epoch.
    pub expires_at: u64,
}

/// Establishes a player's identity from their first frame.
///
/// `Send + Sync + 'static` because one authenticator is shared by
/// every connection task for the life of the server. Both methods
/// return `Send` futures so they can be awaited inside spawned tasks.
///
/// # Example
///
/// ```rust
/// use manhunt_protocol::PlayerId;
/// use manhunt_session::{AuthGrant, Authenticator, SessionError};
///
/// /// Accepts any name and uses its length as the player id.
/// /// Handy in tests, never in production.
/// struct StubAuth;
///
/// impl Authenticator for StubAuth {
///     async fn login(
///         &self,
///         name: &str,
///         _password: &str,
///     ) -> Result<AuthGrant, SessionError> {
///         Ok(AuthGrant {
///             player_id: PlayerId(name.len() as u64),
///             access_token: String::new(),
///             refresh_token: String::new(),
///             expires_at: 0,
///         })
///     }
///
///     async fn resume(
///         &self,
///         _access_token: &str,
///     ) -> Result<PlayerId, SessionError> {
///         Err(SessionError::TokenInvalid("stub".into()))
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Checks credentials and issues tokens for a fresh login.
    ///
    /// # Errors
    /// [`SessionError::AuthFailed`] when the credentials are wrong.
    fn login(
        &self,
        name: &str,
        password: &str,
    ) -> impl std::future::Future<Output = Result<AuthGrant, SessionError>> + Send;

    /// Validates a previously issued access token on reconnect.
    ///
    /// # Errors
    /// [`SessionError::TokenInvalid`] or
    /// [`SessionError::TokenExpired`] when the token doesn't pass.
    fn resume(
        &self,
        access_token: &str,
    ) -> impl std::future::Future<Output = Result<PlayerId, SessionError>> + Send;
}

// ---------------------------------------------------------------------------
// TokenAuthenticator
// ---------------------------------------------------------------------------

/// The production [`Authenticator`]: configured credentials for login,
/// signed tokens for resume.
pub struct TokenAuthenticator {
    registry: CredentialRegistry,
    issuer: TokenIssuer,
}

impl TokenAuthenticator {
    pub fn new(registry: CredentialRegistry, issuer: TokenIssuer) -> Self {
        Self { registry, issuer }
    }
}

impl Authenticator for TokenAuthenticator {
    async fn login(
        &self,
        name: &str,
        password: &str,
    ) -> Result<AuthGrant, SessionError> {
        let player_id = self.registry.verify(name, password)?;
        let pair = self.issuer.issue(player_id)?;
        tracing::info!(%player_id, name, "player authenticated");
        Ok(AuthGrant {
            player_id,
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            expires_at: pair.expires_at,
        })
    }

    async fn resume(
        &self,
        access_token: &str,
    ) -> Result<PlayerId, SessionError> {
        let player_id = self.issuer.verify_access(access_token)?;
        tracing::info!(%player_id, "player resumed with access token");
        Ok(player_id)
    }
}

// =========================================================================
// Tests
// =========================================================================
