//! Codec trait and implementations for serializing messages.
//!
//! The server and its tests speak through a [`Codec`] rather than
//! calling `serde_json` directly, so the wire format is swappable in
//! one place. [`JsonCodec`] is the shipped implementation; the phone
//! clients speak JSON over a socket.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts messages to and from bytes.
///
/// `Send + Sync + 'static` because a codec is shared by every
/// connection task for the life of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON via `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use manhunt_protocol::{Codec, JsonCodec, ClientMessage, PlayerId, Role};
///
/// let codec = JsonCodec;
///
/// let msg = ClientMessage::LocationReport {
///     player_id: PlayerId(0),
///     role: Role::Seeker,
///     lat: 40.0,
///     lon: -70.0,
/// };
///
/// let bytes = codec.encode(&msg).unwrap();
/// let decoded: ClientMessage = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{GameResult, ServerMessage};

    #[test]
    fn test_json_codec_encodes_server_message() {
        let codec = JsonCodec;
        let msg = ServerMessage::GameOver {
            result: GameResult::SeekerLoses,
        };
        let bytes = codec.encode(&msg).unwrap();
        let json: serde_json::Value =
            serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["event"], "game_over");
        assert_eq!(json["result"], "cop_loses");
    }

    #[test]
    fn test_json_codec_decode_rejects_garbage() {
        let codec = JsonCodec;
        let result: Result<ServerMessage, _> = codec.decode(b"\x00\x01");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
