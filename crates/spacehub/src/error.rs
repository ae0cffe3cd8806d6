//! Unified error type for the Spacehub server.

use spacehub_hub::HubError;
use spacehub_protocol::ProtocolError;
use spacehub_transport::TransportError;

/// Top-level error that wraps the errors of every layer.
///
/// None of these reach a client. Rejections a client should hear about
/// (a full lobby, a taken role) are sent as ERROR frames by the hub and
/// never surface here.
#[derive(Debug, thiserror::Error)]
pub enum SpacehubError {
    /// A transport-level error (bind, upgrade, send, recv, timeout).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The hub actor is gone.
    #[error(transparent)]
    Hub(#[from] HubError),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Binding or serving the health endpoint failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
