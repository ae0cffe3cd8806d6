//! Data types shared by several messages: identities, roles, lobby
//! rosters, and world entities.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Process-local identifier the hub assigns to a connection when it
/// registers. Never reused while the process runs.
///
/// `#[serde(transparent)]` keeps it a plain number on the wire, which is
/// what the roster's `id` field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// A gameplay function a lobby member can claim. Each role is held by at
/// most one member of a lobby.
///
/// A member without a role is `Option::<Role>::None`, which goes on the
/// wire as `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Shooter,
    Hauler,
}

impl Role {
    /// Every claimable role.
    pub const ALL: [Role; 2] = [Role::Shooter, Role::Hauler];

    /// Parses the wire spelling. Only the exact lowercase names are
    /// recognized.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "shooter" => Some(Self::Shooter),
            "hauler" => Some(Self::Hauler),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Shooter => "shooter",
            Self::Hauler => "hauler",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Lobby roster
// ---------------------------------------------------------------------------

/// Whether a lobby is ready to play. Derived from membership, never
/// stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LobbyStatus {
    /// Some role is still unclaimed.
    Waiting,
    /// Both roles are held by distinct members.
    Playing,
}

/// One row of a lobby roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: ClientId,
    pub name: String,
    pub role: Option<Role>,
    /// Always `true`: departed members are removed from the roster
    /// rather than flagged.
    pub connected: bool,
}

/// The roster a LOBBY_UPDATE carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LobbyInfo {
    pub code: String,
    /// Members in join order.
    pub players: Vec<PlayerInfo>,
    pub max_players: usize,
    pub status: LobbyStatus,
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// What kind of world object an [`Entity`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Asteroid,
}

/// A world object as it appears in a STATE snapshot.
///
/// `type` and `hp` are left out of the JSON when absent; position and
/// velocity are always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u32,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<EntityKind>,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub vx: f64,
    pub vy: f64,
    pub vz: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<u32>,
}
