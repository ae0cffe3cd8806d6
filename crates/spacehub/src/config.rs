//! Server configuration and environment loading.

use std::str::FromStr;
use std::time::Duration;

use spacehub_hub::HubConfig;
use spacehub_transport::WebSocketConfig;

use crate::SpacehubError;

/// Everything needed to run a server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub ws_addr: String,
    /// Request path the WebSocket upgrade is served on.
    pub ws_path: String,
    /// Address the health endpoint binds to.
    pub health_addr: String,
    /// Largest inbound message, in bytes.
    pub max_frame_bytes: usize,
    /// A connection with no inbound frame for this long is dead.
    pub read_timeout: Duration,
    /// Deadline for writing one frame.
    pub write_timeout: Duration,
    /// How often the server pings an otherwise idle connection. Must be
    /// shorter than `read_timeout`.
    pub keepalive_interval: Duration,
    /// How long a TCP peer gets to finish the WebSocket upgrade.
    pub handshake_timeout: Duration,
    pub hub: HubConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_addr: "0.0.0.0:8080".to_string(),
            ws_path: "/ws".to_string(),
            health_addr: "0.0.0.0:8081".to_string(),
            max_frame_bytes: 512,
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(10),
            keepalive_interval: Duration::from_secs(54),
            handshake_timeout: Duration::from_secs(5),
            hub: HubConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by any `SPACEHUB_*` environment variables.
    ///
    /// # Errors
    /// `Config` if a variable does not parse or the result fails
    /// [`validate`](Self::validate).
    pub fn from_env() -> Result<Self, SpacehubError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`from_env`](Self::from_env), reading variables through
    /// `lookup` instead of the process environment.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, SpacehubError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("SPACEHUB_WS_ADDR") {
            config.ws_addr = addr;
        }
        if let Some(path) = lookup("SPACEHUB_WS_PATH") {
            config.ws_path = path;
        }
        if let Some(addr) = lookup("SPACEHUB_HEALTH_ADDR") {
            config.health_addr = addr;
        }
        if let Some(bytes) = parse(&lookup, "SPACEHUB_MAX_FRAME_BYTES")? {
            config.max_frame_bytes = bytes;
        }
        if let Some(secs) = parse(&lookup, "SPACEHUB_READ_TIMEOUT_SECS")? {
            config.read_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "SPACEHUB_WRITE_TIMEOUT_SECS")? {
            config.write_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "SPACEHUB_KEEPALIVE_SECS")? {
            config.keepalive_interval = Duration::from_secs(secs);
        }
        if let Some(secs) = parse(&lookup, "SPACEHUB_HANDSHAKE_TIMEOUT_SECS")? {
            config.handshake_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = parse(&lookup, "SPACEHUB_TICK_MS")? {
            config.hub.tick.period = Duration::from_millis(ms);
        }
        if let Some(policy) = parse(&lookup, "SPACEHUB_TICK_POLICY")? {
            config.hub.tick.policy = policy;
        }
        if let Some(cap) = parse(&lookup, "SPACEHUB_OUTBOUND_CAPACITY")? {
            config.hub.outbound_capacity = cap;
        }

        config.validate()?;
        Ok(config)
    }

    /// Rejects settings the connection pumps cannot work with.
    pub fn validate(&self) -> Result<(), SpacehubError> {
        if !self.ws_path.starts_with('/') {
            return Err(SpacehubError::Config(format!(
                "ws_path must start with '/', got {:?}",
                self.ws_path
            )));
        }
        if self.max_frame_bytes == 0 {
            return Err(SpacehubError::Config(
                "max_frame_bytes must be positive".into(),
            ));
        }
        for (name, value) in [
            ("read_timeout", self.read_timeout),
            ("write_timeout", self.write_timeout),
            ("keepalive_interval", self.keepalive_interval),
            ("handshake_timeout", self.handshake_timeout),
        ] {
            if value.is_zero() {
                return Err(SpacehubError::Config(format!(
                    "{name} must be positive"
                )));
            }
        }
        if self.keepalive_interval >= self.read_timeout {
            return Err(SpacehubError::Config(format!(
                "keepalive_interval ({:?}) must be shorter than read_timeout ({:?})",
                self.keepalive_interval, self.read_timeout
            )));
        }
        Ok(())
    }

    pub(crate) fn websocket(&self) -> WebSocketConfig {
        WebSocketConfig {
            path: self.ws_path.clone(),
            max_frame_bytes: self.max_frame_bytes,
            handshake_timeout: self.handshake_timeout,
        }
    }
}

fn parse<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Result<Option<T>, SpacehubError>
where
    T::Err: std::fmt::Display,
{
    lookup(name)
        .map(|raw| {
            raw.trim().parse().map_err(|e| {
                SpacehubError::Config(format!("{name}={raw:?}: {e}"))
            })
        })
        .transpose()
}
