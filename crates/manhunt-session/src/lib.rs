//! Player identity for the manhunt game server.
//!
//! This crate is deliberately thin plumbing around two facts:
//!
//! 1. **Who can play**: a fixed list of configured credentials, one
//!    stable [`PlayerId`](manhunt_protocol::PlayerId) per name
//!    ([`CredentialRegistry`]).
//! 2. **How a reconnect proves identity**: signed tokens carrying that
//!    id ([`TokenIssuer`]), so no server-side session table is needed.
//!
//! The connection handler sees only the [`Authenticator`] trait; the
//! game engine never sees this crate at all.
//!
//! ```text
//! Handler (above)  ← calls login/resume during the handshake
//!     ↕
//! Session layer (this crate)  ← credentials, tokens
//!     ↕
//! Protocol layer (below)  ← provides PlayerId
//! ```

#![allow(async_fn_in_trait)]

mod auth;
mod credentials;
mod error;
mod token;

pub use auth::{AuthGrant, Authenticator, TokenAuthenticator};
pub use credentials::CredentialRegistry;
pub use error::SessionError;
pub use token::{Claims, TokenIssuer, TokenKind, TokenPair};
