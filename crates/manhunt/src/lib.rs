//! # Manhunt
//!
//! Server-authoritative backend for a real-world hide-and-seek game
//! played on phones: one cop hunts a set of mafia players by physically
//! walking within the elimination radius of their reported positions.
//!
//! The server runs a single game session. Clients connect over
//! WebSocket, log in, and stream location reports; the engine assigns
//! roles (first in is the cop), eliminates mafia inside the radius,
//! and ends the game when the cop catches everyone or the clock runs
//! out first.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use manhunt::prelude::*;
//!
//! # async fn run() -> Result<(), ManhuntError> {
//! let config = ServerConfig::from_env();
//! let registry = CredentialRegistry::new(config.credentials());
//! let issuer = TokenIssuer::new(
//!     config.secret_key.as_bytes(),
//!     config.access_token_ttl,
//!     config.refresh_token_ttl,
//! );
//!
//! let server = ManhuntServerBuilder::new()
//!     .config(config)
//!     .build(
//!         TokenAuthenticator::new(registry, issuer),
//!         MemoryStore::new(),
//!     )
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::ServerConfig;
pub use error::ManhuntError;
pub use server::{ManhuntServer, ManhuntServerBuilder};

/// Everything needed to assemble and run a server.
pub mod prelude {
    pub use crate::{
        ManhuntError, ManhuntServer, ManhuntServerBuilder, ServerConfig,
    };

    pub use manhunt_engine::{GameConfig, GameSession, Outcome};
    pub use manhunt_protocol::{
        ClientMessage, Codec, GameResult, JsonCodec, PlayerId,
        PlayerSnapshot, PlayerStatus, Position, Role, ServerMessage,
    };
    pub use manhunt_session::{
        AuthGrant, Authenticator, CredentialRegistry, SessionError,
        TokenAuthenticator, TokenIssuer,
    };
    pub use manhunt_store::{LocationStore, MemoryStore, StoreError};
    pub use manhunt_transport::{
        Connection, Transport, TransportError, WebSocketTransport,
    };
}
