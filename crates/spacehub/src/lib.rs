//! # Spacehub
//!
//! Real-time lobby relay for a two-player co-op space shooter.
//!
//! Browser clients connect over WebSocket, meet in two-seat lobbies,
//! claim the shooter and hauler roles, and receive a snapshot of their
//! lobby's world about fifteen times a second. All lobby state lives in a
//! single hub actor; each connection runs an inbound and an outbound pump
//! that talk to the hub through channels.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use spacehub::prelude::*;
//!
//! # async fn start() -> Result<(), SpacehubError> {
//! let server = SpacehubServer::builder()
//!     .config(ServerConfig::from_env()?)
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
pub mod health;
mod server;

pub use config::ServerConfig;
pub use error::SpacehubError;
pub use server::{SpacehubServer, SpacehubServerBuilder};

pub mod prelude {
    //! Re-exports of the types most servers and tests need.

    pub use crate::{
        ServerConfig, SpacehubError, SpacehubServer, SpacehubServerBuilder,
    };
    pub use spacehub_hub::{HubConfig, HubHandle, HubStats, LobbySnapshot};
    pub use spacehub_lobby::LobbyConfig;
    pub use spacehub_protocol::{
        ClientId, ClientMessage, LobbyInfo, LobbyStatus, Role, ServerMessage,
    };
    pub use spacehub_tick::{TickConfig, TickPolicy};
}
