//! Wire protocol for Spacehub.
//!
//! This crate defines the messages that travel between the browser
//! client and the hub, and how they become bytes:
//!
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): the JSON
//!   envelopes, discriminated by their `type` field.
//! - **Types** ([`ClientId`], [`Role`], [`LobbyInfo`], [`Entity`], ...):
//!   the data those envelopes carry.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes ↔ types.
//! - **Errors** ([`ProtocolError`]): what a malformed frame looks like.
//!
//! The protocol layer is stateless. It knows nothing about connections
//! or lobbies.
//!
//! ```text
//! Transport (frames) → Protocol (ClientMessage) → Hub (lobby state)
//! ```

mod codec;
mod error;
mod messages;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{
    ClientMessage, INPUT, InputCommand, JOIN, JoinRequest, ROLE_SELECT,
    RoleSelectRequest, ServerMessage,
};
pub use types::{
    ClientId, Entity, EntityKind, LobbyInfo, LobbyStatus, PlayerInfo, Role,
};
