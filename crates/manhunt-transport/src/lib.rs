//! Transport layer for the manhunt server.
//!
//! Provides the [`Transport`] and [`Connection`] traits that the
//! connection handler is written against, plus the WebSocket
//! implementation the server actually runs on. The handler both
//! replies on a connection and pushes broadcast events to it from a
//! separate task, so connections are cheap to clone and safe to drive
//! from two tasks at once.
//!
//! # Feature Flags
//!
//! - `websocket` (default) - WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketTransport};

use std::fmt;

/// Opaque identifier for a connection, handed out at accept time.
///
/// Distinct from a player id: one player may connect, drop, and
/// reconnect, producing several connection ids over a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wraps a raw counter value.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw counter value, for logs and map keys.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Listens for and hands out player connections.
pub trait Transport: Send + Sync + 'static {
    /// Connection type this transport produces.
    type Connection: Connection;
    /// Error type for listen and accept failures.
    type Error: std::error::Error + Send + Sync;

    /// Blocks until the next player connects.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive message payloads.
///
/// `Clone` hands out another handle to the same underlying socket:
/// the handler keeps one for request/reply and gives one to the
/// broadcast forwarder task. Sends from the two handles are
/// serialized; a receive in flight never blocks a send.
pub trait Connection: Clone + Send + Sync + 'static {
    /// Error type for send and receive failures.
    type Error: std::error::Error + Send + Sync;

    /// Sends one message payload to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message payload from the remote peer.
    ///
    /// A clean close surfaces as `Ok(None)` rather than an error.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection from this side.
    async fn close(&self) -> Result<(), Self::Error>;

    /// This connection's identifier, stable for its lifetime.
    fn id(&self) -> ConnectionId;
}
