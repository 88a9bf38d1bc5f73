//! Errors for message encoding and decoding.
//!
//! Each crate in the workspace defines its own error enum; a
//! `ProtocolError` always means a message failed to cross the
//! byte boundary, never a game-rule or transport problem.

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed. Wraps the original `serde_json` error so
    /// callers handle codecs uniformly.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, wrong
    /// types, or an unknown tag.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates a protocol rule, e.g. a
    /// handshake frame arriving after the handshake completed.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
