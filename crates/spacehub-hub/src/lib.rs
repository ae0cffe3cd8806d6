//! The Spacehub hub: one actor task that owns every client registration
//! and every lobby.
//!
//! Connection tasks never touch shared state. They talk to the hub
//! through a [`HubHandle`], and the hub talks back through each client's
//! bounded outbound queue. The hub never waits on a client: frames for a
//! full queue are dropped.
//!
//! ```text
//! inbound pump ──HubCommand──▶ hub actor ──Frame──▶ outbound pump
//!                                 ▲
//!                               tick
//! ```
//!
//! # Key types
//!
//! - [`spawn_hub`]: start the actor
//! - [`HubHandle`]: register clients and submit their commands
//! - [`Registration`]: a client's id and outbound queue
//! - [`HubConfig`]: tick cadence, queue sizes, lobby settings

mod config;
mod error;
mod handle;
mod hub;

pub use config::HubConfig;
pub use error::HubError;
pub use handle::{
    ClientSnapshot, Frame, HubHandle, HubStats, LobbySnapshot, OutboundQueue,
    Registration,
};
pub use hub::spawn_hub;
