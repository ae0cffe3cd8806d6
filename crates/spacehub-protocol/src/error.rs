//! Error types for the protocol layer.
//!
//! Every variant here is a "malformed message": the offending frame is
//! logged and dropped, and the connection that sent it stays open.

/// Errors that can occur while encoding or decoding messages.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: not JSON, missing required fields, or
    /// fields of the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The `type` discriminator names no message this server accepts.
    #[error("unknown message type: {0:?}")]
    UnknownType(String),

    /// The message decoded but breaks a protocol rule, e.g. a JOIN with
    /// an empty lobby code.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
