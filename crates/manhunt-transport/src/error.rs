/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer went away mid-exchange. The payload names the phase,
    /// e.g. a socket dropped before presenting credentials.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Writing a frame to the peer failed; the socket is unusable.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Reading the next frame failed mid-stream, as opposed to a
    /// clean close (which `recv` reports as `Ok(None)`).
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding the listener or accepting an incoming socket failed,
    /// including a failed WebSocket upgrade handshake.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}
