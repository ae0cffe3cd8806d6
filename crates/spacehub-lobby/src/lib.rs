//! Lobby state for Spacehub.
//!
//! Pure, synchronous bookkeeping owned by the hub actor. Nothing here
//! touches a socket or a channel.
//!
//! # Key types
//!
//! - [`LobbyDirectory`]: every live lobby plus the client → lobby map
//! - [`Lobby`]: one lobby's members, roles, and entities
//! - [`LobbyConfig`]: capacity and world layout
//! - [`LobbyError`]: rejected operations, worded for the client

mod config;
mod directory;
mod error;
mod lobby;
pub mod world;

pub use config::LobbyConfig;
pub use directory::{Departure, LobbyDirectory};
pub use error::LobbyError;
pub use lobby::{Lobby, Member};
