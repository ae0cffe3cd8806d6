//! Hub actor: the single owner of the client registry and the lobby
//! directory.
//!
//! Everything that changes membership goes through one mpsc channel and
//! is applied here, one command at a time. The same loop fires the
//! snapshot broadcast on every tick, so a tick never observes a
//! half-applied command.

use std::collections::HashMap;

use spacehub_lobby::{LobbyDirectory, LobbyError};
use spacehub_protocol::{
    ClientId, Codec, InputCommand, JsonCodec, ServerMessage,
};
use spacehub_tick::TickScheduler;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::handle::{
    ClientSnapshot, Frame, HubCommand, HubStats, LobbySnapshot, Registration,
};
use crate::{HubConfig, HubHandle};

/// What the hub keeps per registered client. Name and role live in the
/// client's lobby entry.
struct ClientEntry {
    outbound: mpsc::Sender<Frame>,
    last_input_seq: Option<i64>,
}

struct Hub {
    outbound_capacity: usize,
    next_id: u64,
    clients: HashMap<ClientId, ClientEntry>,
    lobbies: LobbyDirectory,
    scheduler: TickScheduler,
    codec: JsonCodec,
    receiver: mpsc::Receiver<HubCommand>,
}

/// Spawns the hub actor and returns a handle to it.
///
/// The actor stops once every [`HubHandle`] has been dropped. Stopping
/// drops every client's queue sender, so each outbound pump sees its
/// queue end.
pub fn spawn_hub(config: HubConfig) -> HubHandle {
    let config = config.validated();
    let (tx, rx) = mpsc::channel(config.command_capacity);

    let hub = Hub {
        outbound_capacity: config.outbound_capacity,
        next_id: 1,
        clients: HashMap::new(),
        lobbies: LobbyDirectory::new(config.lobby),
        scheduler: TickScheduler::new(config.tick),
        codec: JsonCodec,
        receiver: rx,
    };

    tokio::spawn(hub.run());

    HubHandle::new(tx)
}

impl Hub {
    async fn run(mut self) {
        tracing::info!(
            tick_ms = self.scheduler.period().as_millis() as u64,
            "hub started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => self.handle(cmd),
                    None => break,
                },
                tick = self.scheduler.wait_for_tick() => {
                    if tick.overrun {
                        tracing::debug!(
                            tick = tick.tick,
                            skipped = tick.ticks_skipped,
                            "snapshot broadcast running late"
                        );
                    }
                    self.broadcast_state(tick.tick);
                    self.scheduler.record_tick_end();
                }
            }
        }

        tracing::info!(
            clients = self.clients.len(),
            lobbies = self.lobbies.len(),
            "hub stopped"
        );
    }

    fn handle(&mut self, cmd: HubCommand) {
        match cmd {
            HubCommand::Register { reply } => self.handle_register(reply),
            HubCommand::Unregister { id } => self.handle_unregister(id),
            HubCommand::Join { id, lobby, name } => {
                self.handle_join(id, &lobby, &name);
            }
            HubCommand::SelectRole { id, role } => {
                self.handle_select_role(id, &role);
            }
            HubCommand::Input { id, input } => self.handle_input(id, input),
            HubCommand::Stats { reply } => {
                let _ = reply.send(HubStats {
                    clients: self.clients.len(),
                    lobbies: self.lobbies.len(),
                    ticks: self.scheduler.tick_count(),
                    tick_metrics: self.scheduler.metrics().clone(),
                });
            }
            HubCommand::Lobby { code, reply } => {
                let snapshot = self.lobbies.get(&code).map(|lobby| {
                    LobbySnapshot {
                        info: lobby.info(),
                        entity_count: lobby.entities().len(),
                    }
                });
                let _ = reply.send(snapshot);
            }
            HubCommand::Client { id, reply } => {
                let snapshot = self.clients.get(&id).map(|entry| {
                    ClientSnapshot {
                        id,
                        lobby: self
                            .lobbies
                            .lobby_of(id)
                            .map(|l| l.code().to_owned()),
                        last_input_seq: entry.last_input_seq,
                    }
                });
                let _ = reply.send(snapshot);
            }
        }
    }

    fn handle_register(
        &mut self,
        reply: tokio::sync::oneshot::Sender<Registration>,
    ) {
        let id = ClientId(self.next_id);
        self.next_id += 1;

        let (tx, rx) = mpsc::channel(self.outbound_capacity);
        self.clients.insert(
            id,
            ClientEntry {
                outbound: tx,
                last_input_seq: None,
            },
        );

        if reply.send(Registration { id, outbound: rx }).is_err() {
            // The caller went away before hearing its id.
            self.clients.remove(&id);
            return;
        }
        tracing::info!(client = %id, clients = self.clients.len(), "client registered");
    }

    fn handle_unregister(&mut self, id: ClientId) {
        // Dropping the entry drops the queue sender, which ends the
        // client's outbound pump.
        if self.clients.remove(&id).is_some() {
            tracing::info!(client = %id, clients = self.clients.len(), "client unregistered");
        }

        if let Some(departure) = self.lobbies.leave(id) {
            tracing::info!(
                lobby = %departure.code,
                client = %id,
                name = %departure.member.name,
                freed_role = ?departure.member.role,
                "client left lobby"
            );
            if !departure.lobby_closed {
                self.broadcast_roster(&departure.code);
            }
        }
    }

    fn handle_join(&mut self, id: ClientId, code: &str, name: &str) {
        if !self.clients.contains_key(&id) {
            tracing::debug!(client = %id, "join from unregistered client, ignoring");
            return;
        }
        match self.lobbies.join(id, code, name).map(|_| ()) {
            Ok(()) => self.broadcast_roster(code),
            Err(e) => self.reject(id, &e),
        }
    }

    fn handle_select_role(&mut self, id: ClientId, role: &str) {
        if !self.clients.contains_key(&id) {
            tracing::debug!(client = %id, "role select from unregistered client, ignoring");
            return;
        }
        match self
            .lobbies
            .select_role(id, role)
            .map(|lobby| lobby.code().to_owned())
        {
            Ok(code) => self.broadcast_roster(&code),
            Err(e) => self.reject(id, &e),
        }
    }

    /// Inputs are only recorded. Nothing simulates them yet, and the
    /// sequence number is taken as-is, even if it goes backwards.
    fn handle_input(&mut self, id: ClientId, input: InputCommand) {
        if let Some(entry) = self.clients.get_mut(&id) {
            entry.last_input_seq = Some(input.seq);
            tracing::trace!(client = %id, seq = input.seq, "input recorded");
        }
    }

    /// Sends the current roster of lobby `code` to each of its members.
    fn broadcast_roster(&self, code: &str) {
        let Some(lobby) = self.lobbies.get(code) else {
            return;
        };
        let msg = ServerMessage::LobbyUpdate { lobby: lobby.info() };
        self.fan_out(&msg, lobby.member_ids());
    }

    /// Sends one STATE frame per lobby to each of its members.
    fn broadcast_state(&self, tick: u64) {
        for lobby in self.lobbies.iter() {
            if lobby.is_empty() {
                continue;
            }
            let msg = ServerMessage::State {
                seq: tick,
                entities: lobby.entities().to_vec(),
            };
            self.fan_out(&msg, lobby.member_ids());
        }
        tracing::trace!(tick, lobbies = self.lobbies.len(), "state broadcast");
    }

    fn reject(&self, id: ClientId, err: &LobbyError) {
        tracing::debug!(client = %id, error = ?err, "request rejected");
        self.fan_out(&ServerMessage::error(err.to_string()), std::iter::once(id));
    }

    /// Encodes `msg` once and queues it for every recipient.
    fn fan_out(
        &self,
        msg: &ServerMessage,
        recipients: impl IntoIterator<Item = ClientId>,
    ) {
        let frame: Frame = match self.codec.encode(msg) {
            Ok(bytes) => Frame::from(bytes),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode outbound message");
                return;
            }
        };
        for id in recipients {
            self.deliver(id, &frame);
        }
    }

    /// Queues a frame for one client without waiting. A full queue drops
    /// the frame; the next snapshot supersedes it.
    fn deliver(&self, id: ClientId, frame: &Frame) {
        let Some(entry) = self.clients.get(&id) else {
            return;
        };
        match entry.outbound.try_send(frame.clone()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::debug!(client = %id, "outbound queue full, dropping frame");
            }
            Err(TrySendError::Closed(_)) => {
                tracing::trace!(client = %id, "outbound queue closed");
            }
        }
    }
}
