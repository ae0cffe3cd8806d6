//! WebSocket transport implementation using `tokio-tungstenite`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use bytes::Bytes;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::handshake::server::{
    ErrorResponse, Request, Response,
};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig as ProtocolConfig;
use tokio_tungstenite::tungstenite::{Error as WsError, Message, Utf8Bytes};

use crate::{Connection, Handshake, Inbound, Transport, TransportError};

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// Settings applied to every accepted WebSocket.
#[derive(Debug, Clone)]
pub struct WebSocketConfig {
    /// Request path the upgrade is served on. Other paths get a 404.
    pub path: String,
    /// Largest accepted message or frame, in bytes. Anything bigger is a
    /// receive error and ends the connection.
    pub max_frame_bytes: usize,
    /// How long a TCP peer gets to finish the HTTP upgrade.
    pub handshake_timeout: Duration,
}

impl Default for WebSocketConfig {
    fn default() -> Self {
        Self {
            path: "/ws".to_string(),
            max_frame_bytes: 512,
            handshake_timeout: Duration::from_secs(5),
        }
    }
}

impl WebSocketConfig {
    fn protocol_config(&self) -> ProtocolConfig {
        let mut config = ProtocolConfig::default();
        config.max_message_size = Some(self.max_frame_bytes);
        config.max_frame_size = Some(self.max_frame_bytes);
        config
    }
}

/// A WebSocket-based [`Transport`] that listens for incoming connections.
pub struct WebSocketTransport {
    listener: TcpListener,
    config: Arc<WebSocketConfig>,
}

impl WebSocketTransport {
    /// Binds a new WebSocket transport to the given address.
    pub async fn bind(
        addr: &str,
        config: WebSocketConfig,
    ) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, path = %config.path, "WebSocket transport listening");
        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }
}

impl Transport for WebSocketTransport {
    type Connection = WebSocketConnection;
    type Pending = PendingWebSocket;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Pending, Self::Error> {
        let (stream, peer) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        Ok(PendingWebSocket {
            stream,
            peer,
            config: Arc::clone(&self.config),
        })
    }

    fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

/// A TCP peer waiting for its WebSocket upgrade.
pub struct PendingWebSocket {
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<WebSocketConfig>,
}

impl Handshake for PendingWebSocket {
    type Connection = WebSocketConnection;
    type Error = TransportError;

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Upgrades on the configured path only; any other path is answered
    /// with a 404. Gives up after `handshake_timeout`, dropping the socket.
    async fn complete(self) -> Result<Self::Connection, Self::Error> {
        let Self {
            stream,
            peer,
            config,
        } = self;

        let path = config.path.clone();
        let check_path = move |req: &Request, resp: Response| {
            if req.uri().path() == path {
                Ok(resp)
            } else {
                let mut rejection: ErrorResponse =
                    ErrorResponse::new(Some("not found".to_string()));
                *rejection.status_mut() = StatusCode::NOT_FOUND;
                Err(rejection)
            }
        };

        let upgrade = tokio_tungstenite::accept_hdr_async_with_config(
            stream,
            check_path,
            Some(config.protocol_config()),
        );
        let ws = tokio::time::timeout(config.handshake_timeout, upgrade)
            .await
            .map_err(|_| TransportError::Timeout {
                operation: "handshake",
            })?
            .map_err(|e| {
                TransportError::AcceptFailed(std::io::Error::new(
                    std::io::ErrorKind::ConnectionRefused,
                    e,
                ))
            })?;

        tracing::debug!(%peer, "accepted WebSocket connection");
        Ok(WebSocketConnection::new(ws, peer))
    }
}

/// A single WebSocket connection.
///
/// The socket is split so the read half and the write half each have
/// their own lock: a task parked in `recv` never holds up `send`.
pub struct WebSocketConnection {
    peer: SocketAddr,
    sink: Mutex<SplitSink<WsStream, Message>>,
    stream: Mutex<SplitStream<WsStream>>,
    closed: AtomicBool,
}

impl WebSocketConnection {
    fn new(ws: WsStream, peer: SocketAddr) -> Self {
        let (sink, stream) = ws.split();
        Self {
            peer,
            sink: Mutex::new(sink),
            stream: Mutex::new(stream),
            closed: AtomicBool::new(false),
        }
    }

    async fn write(&self, msg: Message) -> Result<(), TransportError> {
        if self.is_closed() {
            return Err(TransportError::ConnectionClosed(
                "already closed".into(),
            ));
        }
        self.sink.lock().await.send(msg).await.map_err(send_failed)
    }
}

impl Connection for WebSocketConnection {
    type Error = TransportError;

    /// JSON envelopes go out as text frames; anything that is not UTF-8
    /// goes out as binary. Either way the payload buffer is reused.
    async fn send(&self, data: Bytes) -> Result<(), Self::Error> {
        let msg = match Utf8Bytes::try_from(data.clone()) {
            Ok(text) => Message::Text(text),
            Err(_) => Message::Binary(data),
        };
        self.write(msg).await
    }

    async fn recv(&self) -> Result<Option<Inbound>, Self::Error> {
        loop {
            let msg = self.stream.lock().await.next().await;
            match msg {
                Some(Ok(Message::Binary(data))) => {
                    return Ok(Some(Inbound::Message(data)));
                }
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(Inbound::Message(Bytes::from(text))));
                }
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => {
                    return Ok(Some(Inbound::Probe));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(Message::Frame(_))) => continue,
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(
                        std::io::Error::new(
                            std::io::ErrorKind::ConnectionReset,
                            e,
                        ),
                    ));
                }
            }
        }
    }

    async fn ping(&self) -> Result<(), Self::Error> {
        self.write(Message::Ping(Bytes::new())).await
    }

    async fn close(&self) -> Result<(), Self::Error> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        match self.sink.lock().await.close().await {
            Ok(()) | Err(WsError::ConnectionClosed | WsError::AlreadyClosed) => {
                Ok(())
            }
            Err(e) => Err(send_failed(e)),
        }
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn peer_addr(&self) -> SocketAddr {
        self.peer
    }
}

fn send_failed(e: WsError) -> TransportError {
    TransportError::SendFailed(std::io::Error::new(
        std::io::ErrorKind::BrokenPipe,
        e,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WebSocketConfig::default();
        assert_eq!(config.path, "/ws");
        assert_eq!(config.max_frame_bytes, 512);
        assert_eq!(config.handshake_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_protocol_config_caps_message_and_frame() {
        let config = WebSocketConfig {
            max_frame_bytes: 1024,
            ..WebSocketConfig::default()
        };
        let protocol = config.protocol_config();
        assert_eq!(protocol.max_message_size, Some(1024));
        assert_eq!(protocol.max_frame_size, Some(1024));
    }
}
