//! Token issuance and verification.
//!
//! Login produces a pair of HS256 JWTs: a short-lived access token the
//! client presents when resuming a connection, and a long-lived refresh
//! token. Both carry the player's id in `sub`, which is how a reconnect
//! finds its way back to the same roster entry without any server-side
//! session table.

use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
    errors::ErrorKind, get_current_timestamp,
};
use serde::{Deserialize, Serialize};

use std::time::Duration;

use manhunt_protocol::PlayerId;

use crate::SessionError;

/// Which of the two issued tokens this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// The claims carried by every issued token.
///
/// `sub` is the player id rendered as a string, per JWT convention;
/// `iat` and `exp` are seconds since the epoch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: u64,
    pub exp: u64,
    pub kind: TokenKind,
}

/// The result of a successful login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Absolute expiry of the access token, seconds since the epoch.
    pub expires_at: u64,
}

/// Signs and verifies the session's tokens with a shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Creates an issuer from the shared signing secret and the two
    /// token lifetimes.
    pub fn new(
        secret: &[u8],
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; the default 60 s leeway would let just-dead
        // tokens resume.
        validation.leeway = 0;
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Issues a fresh access/refresh pair for a player.
    ///
    /// # Errors
    /// Returns [`SessionError::TokenCreation`] if signing fails.
    pub fn issue(&self, player_id: PlayerId) -> Result<TokenPair, SessionError> {
        let now = get_current_timestamp();
        let expires_at = now + self.access_ttl.as_secs();

        let access = self.sign(Claims {
            sub: player_id.0.to_string(),
            iat: now,
            exp: expires_at,
            kind: TokenKind::Access,
        })?;
        let refresh = self.sign(Claims {
            sub: player_id.0.to_string(),
            iat: now,
            exp: now + self.refresh_ttl.as_secs(),
            kind: TokenKind::Refresh,
        })?;

        Ok(TokenPair {
            access_token: access,
            refresh_token: refresh,
            expires_at,
        })
    }

    /// Verifies an access token and returns the player it was issued
    /// to.
    ///
    /// # Errors
    /// - [`SessionError::TokenExpired`] when the expiry has passed.
    /// - [`SessionError::TokenInvalid`] for bad signatures, malformed
    ///   claims, or a refresh token presented in place of an access
    ///   token.
    pub fn verify_access(&self, token: &str) -> Result<PlayerId, SessionError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => SessionError::TokenExpired,
                _ => SessionError::TokenInvalid(e.to_string()),
            })?;

        if data.claims.kind != TokenKind::Access {
            return Err(SessionError::TokenInvalid(
                "refresh token presented where an access token is required"
                    .into(),
            ));
        }

        let id: u64 = data.claims.sub.parse().map_err(|_| {
            SessionError::TokenInvalid("malformed subject claim".into())
        })?;
        Ok(PlayerId(id))
    }

    fn sign(&self, claims: Claims) -> Result<String, SessionError> {
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| SessionError::TokenCreation(e.to_string()))
    }
}

// =========================================================================
// Tests
// =========================================================================
