//! `ManhuntServer` builder and accept loop.
//!
//! This is the entry point for running the game server. It ties the
//! layers together: transport, protocol codec, authentication, and the
//! single game session with its broadcast gateway. The session (and
//! its game timer) starts when the server is built; connections come
//! and go against that one running game.

use std::sync::Arc;

use tokio::sync::broadcast;

use manhunt_engine::GameSession;
use manhunt_protocol::{Codec, JsonCodec};
use manhunt_session::Authenticator;
use manhunt_store::LocationStore;
use manhunt_transport::{Transport, WebSocketTransport};

use crate::ManhuntError;
use crate::config::ServerConfig;
use crate::handler::handle_connection;

/// Broadcast backlog per subscriber before old events are dropped.
const EVENT_BUFFER: usize = 256;

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// session carries its own lock; everything else here is read-only.
pub(crate) struct ServerState<A: Authenticator, C: Codec, S: LocationStore> {
    pub(crate) session: GameSession<S>,
    pub(crate) auth: A,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a manhunt server.
///
/// # Example
///
/// ```rust,ignore
/// use manhunt::prelude::*;
///
/// let server = ManhuntServerBuilder::new()
///     .config(ServerConfig::from_env())
///     .build(auth, MemoryStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct ManhuntServerBuilder {
    config: ServerConfig,
}

impl ManhuntServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Binds the listener, starts the game session and its timer, and
    /// returns the server ready to [`run`](ManhuntServer::run).
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`; the authenticator
    /// and location store are the two seams callers swap out.
    pub async fn build<A, S>(
        self,
        auth: A,
        store: S,
    ) -> Result<ManhuntServer<A, JsonCodec, S>, ManhuntError>
    where
        A: Authenticator,
        S: LocationStore,
    {
        let transport =
            WebSocketTransport::bind(&self.config.bind_addr).await?;

        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let session = GameSession::start(self.config.game, store, events);

        let state = Arc::new(ServerState {
            session,
            auth,
            codec: JsonCodec,
        });

        Ok(ManhuntServer { transport, state })
    }
}

impl Default for ManhuntServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running manhunt game server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ManhuntServer<A: Authenticator, C: Codec, S: LocationStore> {
    transport: WebSocketTransport,
    state: Arc<ServerState<A, C, S>>,
}

impl<A, C, S> ManhuntServer<A, C, S>
where
    A: Authenticator,
    C: Codec,
    S: LocationStore,
{
    /// Creates a new builder.
    pub fn builder() -> ManhuntServerBuilder {
        ManhuntServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each
    /// one. Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), ManhuntError> {
        tracing::info!("manhunt server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_connection::<A, C, S>(conn, state).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
