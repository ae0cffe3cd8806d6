//! Transport abstraction layer for Spacehub.
//!
//! Provides the [`Transport`] and [`Connection`] traits that the server
//! drives, so the hub never sees a socket directly.
//!
//! Accepting is split in two. [`Transport::accept`] only takes the next
//! peer off the listener and hands back a [`Handshake`]; the protocol
//! upgrade runs in [`Handshake::complete`], which the server awaits inside
//! the peer's own task. A peer that stalls its upgrade therefore only
//! delays itself.
//!
//! A [`Connection`] is used from two tasks at once: the inbound pump sits
//! in [`Connection::recv`] while the outbound pump calls
//! [`Connection::send`] and [`Connection::ping`]. Implementations must let
//! those proceed independently, and [`Connection::close`] must be safe to
//! call from either side any number of times.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{
    PendingWebSocket, WebSocketConfig, WebSocketConnection, WebSocketTransport,
};

use std::net::SocketAddr;

use bytes::Bytes;

/// One frame read from the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// An application message (text or binary payload bytes).
    Message(Bytes),

    /// A liveness frame (ping or pong). Carries no data but proves the
    /// peer is still there.
    Probe,
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Connection;
    /// An accepted peer whose upgrade has not run yet.
    type Pending: Handshake<Connection = Self::Connection, Error = Self::Error>;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer. Returns as soon as the peer is accepted,
    /// before any protocol upgrade.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<SocketAddr>;
}

/// A peer that has been accepted but not yet upgraded.
pub trait Handshake: Send + 'static {
    /// The connection produced by a successful upgrade.
    type Connection: Connection;
    /// The error type for a failed or timed-out upgrade.
    type Error: std::error::Error + Send + Sync;

    /// The remote address of the peer.
    fn peer_addr(&self) -> SocketAddr;

    /// Runs the protocol upgrade. Bounded by the transport's handshake
    /// timeout.
    async fn complete(self) -> Result<Self::Connection, Self::Error>;
}

/// A single duplex connection to one client.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends one message to the peer. The buffer is shared, not copied.
    async fn send(&self, data: Bytes) -> Result<(), Self::Error>;

    /// Receives the next frame from the peer.
    ///
    /// Returns `Ok(None)` when the peer closed the connection cleanly.
    async fn recv(&self) -> Result<Option<Inbound>, Self::Error>;

    /// Sends a liveness probe (WebSocket ping).
    async fn ping(&self) -> Result<(), Self::Error>;

    /// Closes the connection. Closing twice is a no-op.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Whether [`close`](Self::close) has already been called.
    fn is_closed(&self) -> bool;

    /// The remote address of the peer.
    fn peer_addr(&self) -> SocketAddr;
}
