//! Wire protocol for the manhunt game server.
//!
//! This crate defines the language that clients and the server speak:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Role`],
//!   [`Position`], etc.): the structures that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those messages
//!   are converted to and from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding and decoding.
//!
//! The protocol layer sits between transport (raw frames) and the game
//! engine (authoritative state). It knows nothing about connections,
//! sessions, or distances; it only defines shapes.
//!
//! ```text
//! Transport (frames) → Protocol (messages) → Engine (game state)
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, GameResult, PlayerId, PlayerSnapshot, PlayerStatus,
    Position, Role, ServerMessage,
};
