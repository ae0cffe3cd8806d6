//! The message envelopes: what clients send and what the server sends
//! back.
//!
//! Every envelope is a JSON object whose `type` field names the message.
//! Inbound frames are decoded in two steps: read only the discriminator,
//! then decode the full body into the type it selects. That keeps an
//! unknown `type` distinguishable from a known type with a broken body.

use serde::{Deserialize, Serialize};

use crate::{Codec, Entity, LobbyInfo, ProtocolError};

/// Discriminator for JOIN.
pub const JOIN: &str = "JOIN";
/// Discriminator for ROLE_SELECT.
pub const ROLE_SELECT: &str = "ROLE_SELECT";
/// Discriminator for INPUT.
pub const INPUT: &str = "INPUT";

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// JOIN: put me in the lobby with this code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub lobby: String,
    /// Display name; may be empty.
    #[serde(default)]
    pub player_name: String,
}

/// ROLE_SELECT: claim a role in my current lobby.
///
/// The role stays a raw string here. Whether it names a real role is a
/// lobby rule, answered with an "Invalid role" error rather than a
/// dropped frame. A missing role reads as empty and gets the same answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSelectRequest {
    #[serde(default)]
    pub role: String,
}

/// INPUT: the client's control state for one input sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputCommand {
    /// Client-chosen counter. Signed, and taken as-is.
    pub seq: i64,
    #[serde(default)]
    pub throttle: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub fire: bool,
    /// Only meaningful for haulers.
    #[serde(default)]
    pub tractor: bool,
}

/// A decoded client command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    #[serde(rename = "JOIN")]
    Join(JoinRequest),
    #[serde(rename = "ROLE_SELECT")]
    RoleSelect(RoleSelectRequest),
    #[serde(rename = "INPUT")]
    Input(InputCommand),
}

#[derive(Deserialize)]
struct Discriminator {
    #[serde(rename = "type")]
    kind: String,
}

impl ClientMessage {
    /// Decodes one inbound frame.
    ///
    /// # Errors
    /// - `Decode` if the frame is not an object with a string `type`, or
    ///   the body does not fit the type it names.
    /// - `UnknownType` if `type` is not JOIN, ROLE_SELECT or INPUT.
    /// - `InvalidMessage` for a JOIN with an empty lobby code.
    pub fn decode<C: Codec>(
        codec: &C,
        data: &[u8],
    ) -> Result<Self, ProtocolError> {
        let Discriminator { kind } = codec.decode(data)?;
        match kind.as_str() {
            JOIN => {
                let req: JoinRequest = codec.decode(data)?;
                if req.lobby.is_empty() {
                    return Err(ProtocolError::InvalidMessage(
                        "JOIN needs a lobby code".into(),
                    ));
                }
                Ok(Self::Join(req))
            }
            ROLE_SELECT => Ok(Self::RoleSelect(codec.decode(data)?)),
            INPUT => Ok(Self::Input(codec.decode(data)?)),
            _ => Err(ProtocolError::UnknownType(kind)),
        }
    }

    /// The discriminator this message travels under.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join(_) => JOIN,
            Self::RoleSelect(_) => ROLE_SELECT,
            Self::Input(_) => INPUT,
        }
    }
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Everything the server sends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// A full snapshot of a lobby's entities, sent every tick.
    #[serde(rename = "STATE")]
    State { seq: u64, entities: Vec<Entity> },

    /// The lobby roster changed.
    #[serde(rename = "LOBBY_UPDATE")]
    LobbyUpdate { lobby: LobbyInfo },

    /// A request was rejected. `error` is human-readable.
    #[serde(rename = "ERROR")]
    Error { error: String },
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }
}
