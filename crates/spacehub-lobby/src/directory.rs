//! Directory of live lobbies: creates them on first join, deletes them
//! when the last member leaves, and tracks which lobby each client is in.

use std::collections::HashMap;

use spacehub_protocol::{ClientId, Role};

use crate::{Lobby, LobbyConfig, LobbyError, Member};

/// What happened when a client left its lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Code of the lobby the client left.
    pub code: String,
    /// The member as they were when they left.
    pub member: Member,
    /// `true` if the lobby was deleted because it became empty.
    pub lobby_closed: bool,
}

/// All lobbies in the process, keyed by code.
///
/// Invariants:
/// - a client is in at most one lobby;
/// - no lobby in the directory is empty.
pub struct LobbyDirectory {
    config: LobbyConfig,
    lobbies: HashMap<String, Lobby>,
    memberships: HashMap<ClientId, String>,
}

impl LobbyDirectory {
    pub fn new(config: LobbyConfig) -> Self {
        Self {
            config: config.validated(),
            lobbies: HashMap::new(),
            memberships: HashMap::new(),
        }
    }

    pub fn config(&self) -> &LobbyConfig {
        &self.config
    }

    /// Puts `id` into the lobby named `code`, creating it if needed.
    ///
    /// A rejected join changes nothing; in particular a full lobby is
    /// never touched.
    pub fn join(
        &mut self,
        id: ClientId,
        code: &str,
        name: &str,
    ) -> Result<&Lobby, LobbyError> {
        if let Some(current) = self.memberships.get(&id) {
            return Err(LobbyError::AlreadyInLobby(current.clone()));
        }
        if let Some(existing) = self.lobbies.get(code) {
            if existing.is_full() {
                return Err(LobbyError::LobbyFull(code.to_owned()));
            }
        }

        let config = &self.config;
        let lobby = self.lobbies.entry(code.to_owned()).or_insert_with(|| {
            tracing::info!(lobby = code, "lobby created");
            Lobby::new(code, config)
        });
        lobby.add_member(id, name)?;
        self.memberships.insert(id, code.to_owned());

        tracing::info!(
            lobby = code,
            client = %id,
            players = lobby.len(),
            "client joined lobby"
        );
        Ok(lobby)
    }

    /// Removes `id` from its lobby, deleting the lobby if it is now
    /// empty. Returns `None` if the client was not in a lobby, so
    /// calling it twice is harmless.
    pub fn leave(&mut self, id: ClientId) -> Option<Departure> {
        let code = self.memberships.remove(&id)?;
        let lobby = self.lobbies.get_mut(&code)?;
        let member = lobby.remove_member(id)?;

        let lobby_closed = lobby.is_empty();
        if lobby_closed {
            self.lobbies.remove(&code);
            tracing::info!(lobby = %code, "lobby closed");
        }
        Some(Departure {
            code,
            member,
            lobby_closed,
        })
    }

    /// Claims a role for `id` in its current lobby. `raw` is the role as
    /// the client spelled it.
    ///
    /// Checks run in a fixed order: membership, then role validity, then
    /// availability.
    pub fn select_role(
        &mut self,
        id: ClientId,
        raw: &str,
    ) -> Result<&Lobby, LobbyError> {
        let code = self.memberships.get(&id).ok_or(LobbyError::NotInLobby)?;
        let role = Role::parse(raw)
            .ok_or_else(|| LobbyError::InvalidRole(raw.to_owned()))?;
        let lobby = self
            .lobbies
            .get_mut(code.as_str())
            .ok_or(LobbyError::NotInLobby)?;
        lobby.select_role(id, role)?;

        tracing::info!(
            lobby = %lobby.code(),
            client = %id,
            %role,
            status = ?lobby.status(),
            "role selected"
        );
        Ok(lobby)
    }

    /// Looks up a lobby by code.
    pub fn get(&self, code: &str) -> Option<&Lobby> {
        self.lobbies.get(code)
    }

    /// The lobby `id` is in, if any.
    pub fn lobby_of(&self, id: ClientId) -> Option<&Lobby> {
        self.memberships
            .get(&id)
            .and_then(|code| self.lobbies.get(code))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Lobby> {
        self.lobbies.values()
    }

    /// Number of live lobbies.
    pub fn len(&self) -> usize {
        self.lobbies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lobbies.is_empty()
    }
}
