//! `SpacehubServer` builder and server loop.
//!
//! This is the entry point for running a Spacehub relay. It ties together
//! all the layers: transport → protocol → hub → lobby.

use std::net::SocketAddr;

use spacehub_hub::{HubHandle, spawn_hub};
use spacehub_transport::{Handshake, Transport, WebSocketTransport};
use tokio::net::TcpListener;

use crate::handler::{PumpSettings, handle_connection};
use crate::{ServerConfig, SpacehubError, health};

/// Builder for configuring and starting a Spacehub server.
///
/// # Example
///
/// ```rust,no_run
/// use spacehub::prelude::*;
///
/// # async fn start() -> Result<(), SpacehubError> {
/// let server = SpacehubServer::builder()
///     .bind("0.0.0.0:8080")
///     .health_bind("0.0.0.0:8081")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SpacehubServerBuilder {
    config: ServerConfig,
}

impl SpacehubServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
        }
    }

    /// Replaces the whole configuration, including both addresses. Call
    /// it before [`bind`](Self::bind) or [`health_bind`](Self::health_bind).
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the address the WebSocket listener binds to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.ws_addr = addr.to_string();
        self
    }

    /// Sets the address the health endpoint binds to.
    pub fn health_bind(mut self, addr: &str) -> Self {
        self.config.health_addr = addr.to_string();
        self
    }

    /// Validates the configuration, binds both listeners, and starts the
    /// hub.
    pub async fn build(self) -> Result<SpacehubServer, SpacehubError> {
        let config = self.config;
        config.validate()?;

        let transport =
            WebSocketTransport::bind(&config.ws_addr, config.websocket())
                .await?;
        let health = TcpListener::bind(&config.health_addr).await?;
        let hub = spawn_hub(config.hub.clone());

        Ok(SpacehubServer {
            transport,
            health,
            hub,
            settings: PumpSettings {
                read_timeout: config.read_timeout,
                write_timeout: config.write_timeout,
                keepalive_interval: config.keepalive_interval,
            },
        })
    }
}

impl Default for SpacehubServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Spacehub server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SpacehubServer {
    transport: WebSocketTransport,
    health: TcpListener,
    hub: HubHandle,
    settings: PumpSettings,
}

impl SpacehubServer {
    /// Creates a new builder.
    pub fn builder() -> SpacehubServerBuilder {
        SpacehubServerBuilder::new()
    }

    /// Returns the address the WebSocket listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the address the health endpoint is bound to.
    pub fn health_addr(&self) -> std::io::Result<SocketAddr> {
        self.health.local_addr()
    }

    /// A handle to the running hub, for inspection.
    pub fn hub(&self) -> HubHandle {
        self.hub.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Serves the health endpoint in the background, then accepts
    /// incoming connections and spawns a handler task for each. The
    /// WebSocket upgrade runs inside that task, so a peer that stalls or
    /// fails its upgrade only loses its own connection. Runs until the
    /// process is terminated.
    pub async fn run(mut self) -> Result<(), SpacehubError> {
        tracing::info!(
            ws = %self.local_addr()?,
            health = %self.health_addr()?,
            "Spacehub server running"
        );

        tokio::spawn(health::serve(self.health));

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let hub = self.hub.clone();
                    let settings = self.settings;
                    tokio::spawn(async move {
                        let peer = pending.peer_addr();
                        let conn = match pending.complete().await {
                            Ok(conn) => conn,
                            Err(e) => {
                                tracing::debug!(%peer, error = %e, "upgrade failed");
                                return;
                            }
                        };
                        if let Err(e) =
                            handle_connection(conn, hub, settings).await
                        {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
