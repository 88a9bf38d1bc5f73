//! The credential registry: configured players and their password
//! digests.
//!
//! The roster of possible players is fixed at startup from
//! configuration. Each configured name gets a [`PlayerId`] from its
//! position in the list, which is what keeps identity stable across
//! reconnects: logging in again, or resuming with a token, always lands
//! on the same id.
//!
//! Passwords are held as SHA-256 digests so plaintext never sits in
//! memory longer than the comparison.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use manhunt_protocol::PlayerId;

use crate::SessionError;

/// Maps configured user names to player ids and password digests.
pub struct CredentialRegistry {
    entries: HashMap<String, Entry>,
}

struct Entry {
    player_id: PlayerId,
    digest: [u8; 32],
}

impl CredentialRegistry {
    /// Builds the registry from `(name, password)` pairs.
    ///
    /// Ids are assigned by position: the first pair becomes
    /// `PlayerId(0)`, the second `PlayerId(1)`, and so on. A repeated
    /// name keeps its first id and takes the latest password.
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        let mut entries: HashMap<String, Entry> = HashMap::new();
        let mut next_id = 0u64;
        for (name, password) in pairs {
            let name = name.into();
            let digest = password_digest(&password.into());
            match entries.get_mut(&name) {
                Some(existing) => existing.digest = digest,
                None => {
                    entries.insert(
                        name,
                        Entry {
                            player_id: PlayerId(next_id),
                            digest,
                        },
                    );
                    next_id += 1;
                }
            }
        }
        Self { entries }
    }

    /// Checks a name/password pair and returns the player's id.
    ///
    /// # Errors
    /// Returns [`SessionError::AuthFailed`] for an unknown name or a
    /// wrong password; the two cases are indistinguishable to the
    /// caller and only separated in debug logs.
    pub fn verify(
        &self,
        name: &str,
        password: &str,
    ) -> Result<PlayerId, SessionError> {
        let Some(entry) = self.entries.get(name) else {
            tracing::debug!(name, "login attempt for unknown user");
            return Err(SessionError::AuthFailed(
                "invalid name or password".into(),
            ));
        };
        if entry.digest != password_digest(password) {
            tracing::debug!(name, "login attempt with wrong password");
            return Err(SessionError::AuthFailed(
                "invalid name or password".into(),
            ));
        }
        Ok(entry.player_id)
    }

    /// Number of configured players.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn password_digest(password: &str) -> [u8; 32] {
    Sha256::digest(password.as_bytes()).into()
}

// =========================================================================
// Tests
// =========================================================================
