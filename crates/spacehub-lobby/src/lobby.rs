//! A single lobby: its members, their roles, and its world.

use spacehub_protocol::{
    ClientId, Entity, LobbyInfo, LobbyStatus, PlayerInfo, Role,
};

use crate::{LobbyConfig, LobbyError, world};

/// One member of a lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: ClientId,
    pub name: String,
    pub role: Option<Role>,
}

/// A named group of up to `max_players` clients sharing one world.
///
/// Members are kept in join order; that order is the roster order.
#[derive(Debug, Clone)]
pub struct Lobby {
    code: String,
    max_players: usize,
    members: Vec<Member>,
    entities: Vec<Entity>,
}

impl Lobby {
    /// Creates an empty lobby with a freshly generated world.
    pub fn new(code: impl Into<String>, config: &LobbyConfig) -> Self {
        Self {
            code: code.into(),
            max_players: config.max_players,
            members: Vec::with_capacity(config.max_players),
            entities: world::initial_entities(config),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member_ids(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.members.iter().map(|m| m.id)
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.members.len() >= self.max_players
    }

    pub fn contains(&self, id: ClientId) -> bool {
        self.members.iter().any(|m| m.id == id)
    }

    /// The member currently holding `role`, if any.
    pub fn role_holder(&self, role: Role) -> Option<ClientId> {
        self.members
            .iter()
            .find(|m| m.role == Some(role))
            .map(|m| m.id)
    }

    /// `Playing` once every role is claimed. A member holds at most one
    /// role, so that also means distinct members.
    pub fn status(&self) -> LobbyStatus {
        if Role::ALL.iter().all(|r| self.role_holder(*r).is_some()) {
            LobbyStatus::Playing
        } else {
            LobbyStatus::Waiting
        }
    }

    /// Appends a member with no role.
    pub fn add_member(
        &mut self,
        id: ClientId,
        name: impl Into<String>,
    ) -> Result<(), LobbyError> {
        if self.contains(id) {
            return Err(LobbyError::AlreadyInLobby(self.code.clone()));
        }
        if self.is_full() {
            return Err(LobbyError::LobbyFull(self.code.clone()));
        }
        self.members.push(Member {
            id,
            name: name.into(),
            role: None,
        });
        Ok(())
    }

    /// Removes a member. Any role they held becomes free.
    pub fn remove_member(&mut self, id: ClientId) -> Option<Member> {
        let index = self.members.iter().position(|m| m.id == id)?;
        Some(self.members.remove(index))
    }

    /// Gives `role` to member `id`, releasing whatever role they held
    /// before. Re-selecting the role you already hold succeeds.
    pub fn select_role(
        &mut self,
        id: ClientId,
        role: Role,
    ) -> Result<(), LobbyError> {
        if let Some(holder) = self.role_holder(role) {
            if holder != id {
                return Err(LobbyError::RoleTaken(role));
            }
        }
        let member = self
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(LobbyError::NotInLobby)?;
        member.role = Some(role);
        Ok(())
    }

    /// The roster as it goes out in a LOBBY_UPDATE.
    pub fn info(&self) -> LobbyInfo {
        LobbyInfo {
            code: self.code.clone(),
            players: self
                .members
                .iter()
                .map(|m| PlayerInfo {
                    id: m.id,
                    name: m.name.clone(),
                    role: m.role,
                    connected: true,
                })
                .collect(),
            max_players: self.max_players,
            status: self.status(),
        }
    }
}
