//! Error types for the lobby layer.
//!
//! The `Display` text of each variant is exactly what the offending
//! client receives in its ERROR envelope.

use spacehub_protocol::Role;

/// A rejected lobby operation. Never fatal: the request is refused and
/// no state changes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LobbyError {
    /// The lobby already holds its maximum number of members.
    #[error("Lobby is full")]
    LobbyFull(String),

    /// The client is not a member of any lobby.
    #[error("Not in a lobby")]
    NotInLobby,

    /// The requested role is not one of the recognized roles.
    #[error("Invalid role")]
    InvalidRole(String),

    /// Another member of the lobby already holds this role.
    #[error("Role already taken")]
    RoleTaken(Role),

    /// The client is already a member of a lobby (the one named).
    #[error("Already in a lobby")]
    AlreadyInLobby(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_visible_messages() {
        assert_eq!(LobbyError::LobbyFull("ABCD".into()).to_string(), "Lobby is full");
        assert_eq!(LobbyError::NotInLobby.to_string(), "Not in a lobby");
        assert_eq!(LobbyError::InvalidRole("pilot".into()).to_string(), "Invalid role");
        assert_eq!(LobbyError::RoleTaken(Role::Shooter).to_string(), "Role already taken");
        assert_eq!(
            LobbyError::AlreadyInLobby("ABCD".into()).to_string(),
            "Already in a lobby"
        );
    }
}
