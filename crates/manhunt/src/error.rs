//! Unified error type for the manhunt server.

use manhunt_engine::GameError;
use manhunt_protocol::ProtocolError;
use manhunt_session::SessionError;
use manhunt_store::StoreError;
use manhunt_transport::TransportError;

/// The one error type the server surface exposes.
///
/// Every layer keeps its own enum; this wraps them transparently so
/// builder, handler, and binary code can propagate with `?` without
/// naming five error types. Displays as whichever inner error it
/// carries.
#[derive(Debug, thiserror::Error)]
pub enum ManhuntError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A codec-level error (encode, decode, bad first frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An authentication error (bad credentials, bad or expired token).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A game-rule error (malformed coordinates).
    #[error(transparent)]
    Game(#[from] GameError),

    /// A location store error. The session swallows these itself;
    /// this variant exists for callers driving a store directly.
    #[error(transparent)]
    Store(#[from] StoreError),
}
