//! Integration tests for lobby membership through the directory.

use spacehub_lobby::{LobbyConfig, LobbyDirectory, LobbyError};
use spacehub_protocol::{ClientId, LobbyStatus, Role};

// =========================================================================
// Helpers
// =========================================================================

fn directory() -> LobbyDirectory {
    LobbyDirectory::new(LobbyConfig::default())
}

const A: ClientId = ClientId(1);
const B: ClientId = ClientId(2);
const C: ClientId = ClientId(3);

// =========================================================================
// Join
// =========================================================================

#[test]
fn test_first_join_creates_lobby() {
    let mut dir = directory();
    assert!(dir.is_empty());

    let lobby = dir.join(A, "ABCD", "ace").unwrap();
    assert_eq!(lobby.code(), "ABCD");
    assert_eq!(lobby.len(), 1);
    assert_eq!(lobby.entities().len(), 20);
    assert_eq!(dir.len(), 1);
}

#[test]
fn test_second_join_shares_lobby() {
    let mut dir = directory();
    dir.join(A, "ABCD", "ace").unwrap();
    let lobby = dir.join(B, "ABCD", "bob").unwrap();

    let ids: Vec<_> = lobby.member_ids().collect();
    assert_eq!(ids, vec![A, B]);
    assert_eq!(dir.len(), 1);
}

#[test]
fn test_join_full_lobby_rejected_without_change() {
    let mut dir = directory();
    dir.join(A, "ABCD", "ace").unwrap();
    dir.join(B, "ABCD", "bob").unwrap();

    let err = dir.join(C, "ABCD", "cat").unwrap_err();
    assert_eq!(err, LobbyError::LobbyFull("ABCD".into()));
    assert_eq!(err.to_string(), "Lobby is full");

    assert_eq!(dir.get("ABCD").unwrap().len(), 2);
    assert!(dir.lobby_of(C).is_none());
}

#[test]
fn test_join_while_in_lobby_rejected() {
    let mut dir = directory();
    dir.join(A, "ABCD", "ace").unwrap();

    let err = dir.join(A, "WXYZ", "ace").unwrap_err();
    assert_eq!(err, LobbyError::AlreadyInLobby("ABCD".into()));
    assert!(dir.get("WXYZ").is_none(), "no lobby created on rejection");
    assert_eq!(dir.lobby_of(A).unwrap().code(), "ABCD");
}

#[test]
fn test_lobbies_are_isolated() {
    let mut dir = directory();
    dir.join(A, "ONE", "a").unwrap();
    dir.join(B, "TWO", "b").unwrap();

    assert_eq!(dir.len(), 2);
    assert_eq!(dir.lobby_of(A).unwrap().code(), "ONE");
    assert_eq!(dir.lobby_of(B).unwrap().code(), "TWO");
    assert_eq!(dir.iter().count(), 2);
}

// =========================================================================
// Leave
// =========================================================================

#[test]
fn test_last_leave_deletes_lobby() {
    let mut dir = directory();
    dir.join(A, "ABCD", "ace").unwrap();

    let departure = dir.leave(A).unwrap();
    assert_eq!(departure.code, "ABCD");
    assert_eq!(departure.member.id, A);
    assert!(departure.lobby_closed);
    assert!(dir.get("ABCD").is_none());
    assert!(dir.is_empty());
}

#[test]
fn test_leave_keeps_lobby_for_remaining_member() {
    let mut dir = directory();
    dir.join(A, "ABCD", "ace").unwrap();
    dir.join(B, "ABCD", "bob").unwrap();

    let departure = dir.leave(A).unwrap();
    assert!(!departure.lobby_closed);
    let ids: Vec<_> = dir.get("ABCD").unwrap().member_ids().collect();
    assert_eq!(ids, vec![B]);
}

#[test]
fn test_leave_is_idempotent() {
    let mut dir = directory();
    dir.join(A, "ABCD", "ace").unwrap();
    assert!(dir.leave(A).is_some());
    assert!(dir.leave(A).is_none());
    assert!(dir.leave(C).is_none());
}

#[test]
fn test_recreated_lobby_has_fresh_world() {
    let mut dir = directory();
    dir.join(A, "ABCD", "ace").unwrap();
    dir.select_role(A, "shooter").unwrap();
    dir.leave(A);

    let lobby = dir.join(B, "ABCD", "bob").unwrap();
    assert_eq!(lobby.len(), 1);
    assert_eq!(lobby.role_holder(Role::Shooter), None);
    assert_eq!(lobby.entities().len(), 20);
}

#[test]
fn test_full_lobby_reopens_after_leave() {
    let mut dir = directory();
    dir.join(A, "ABCD", "a").unwrap();
    dir.join(B, "ABCD", "b").unwrap();
    dir.leave(B);
    assert!(dir.join(C, "ABCD", "c").is_ok());
}

// =========================================================================
// Roles
// =========================================================================

#[test]
fn test_role_selection_happy_path() {
    let mut dir = directory();
    dir.join(A, "ABCD", "a").unwrap();
    dir.join(B, "ABCD", "b").unwrap();

    let lobby = dir.select_role(A, "shooter").unwrap();
    assert_eq!(lobby.status(), LobbyStatus::Waiting);

    let lobby = dir.select_role(B, "hauler").unwrap();
    assert_eq!(lobby.status(), LobbyStatus::Playing);
    let info = lobby.info();
    assert_eq!(info.players[0].role, Some(Role::Shooter));
    assert_eq!(info.players[1].role, Some(Role::Hauler));
}

#[test]
fn test_role_taken() {
    let mut dir = directory();
    dir.join(A, "ABCD", "a").unwrap();
    dir.join(B, "ABCD", "b").unwrap();
    dir.select_role(A, "shooter").unwrap();

    let err = dir.select_role(B, "shooter").unwrap_err();
    assert_eq!(err.to_string(), "Role already taken");
    assert_eq!(dir.get("ABCD").unwrap().role_holder(Role::Shooter), Some(A));
}

#[test]
fn test_invalid_role() {
    let mut dir = directory();
    dir.join(A, "ABCD", "a").unwrap();

    for raw in ["pilot", "", "SHOOTER"] {
        let err = dir.select_role(A, raw).unwrap_err();
        assert_eq!(err.to_string(), "Invalid role");
    }
}

#[test]
fn test_role_select_outside_lobby() {
    let mut dir = directory();
    // Membership is checked before the role is parsed.
    let err = dir.select_role(A, "pilot").unwrap_err();
    assert_eq!(err, LobbyError::NotInLobby);
    assert_eq!(err.to_string(), "Not in a lobby");
}

#[test]
fn test_leaving_frees_role() {
    let mut dir = directory();
    dir.join(A, "ABCD", "a").unwrap();
    dir.join(B, "ABCD", "b").unwrap();
    dir.select_role(A, "shooter").unwrap();
    let departure = dir.leave(A).unwrap();
    assert_eq!(departure.member.name, "a");
    assert_eq!(departure.member.role, Some(Role::Shooter));

    assert!(dir.select_role(B, "shooter").is_ok());
}

// =========================================================================
// Configuration
// =========================================================================

#[test]
fn test_custom_capacity() {
    let mut dir = LobbyDirectory::new(LobbyConfig {
        max_players: 3,
        ..LobbyConfig::default()
    });
    dir.join(A, "BIG", "a").unwrap();
    dir.join(B, "BIG", "b").unwrap();
    dir.join(C, "BIG", "c").unwrap();
    assert_eq!(dir.get("BIG").unwrap().info().max_players, 3);
    assert!(dir.join(ClientId(4), "BIG", "d").is_err());
}
