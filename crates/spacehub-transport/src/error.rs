/// Errors that can occur in the transport layer.
///
/// Every variant is fatal to the connection it came from and to nothing
/// else.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The peer went away or the connection was already closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed (includes oversized frames).
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding, accepting, or upgrading a connection failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// A bounded transport operation did not finish in time.
    #[error("{operation} timed out")]
    Timeout {
        /// What was being attempted ("handshake", "send", ...).
        operation: &'static str,
    },
}
