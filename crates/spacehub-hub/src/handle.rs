//! The hub's command channel and the handle used to drive it.

use bytes::Bytes;
use spacehub_protocol::{ClientId, InputCommand, LobbyInfo};
use spacehub_tick::TickMetrics;
use tokio::sync::{mpsc, oneshot};

use crate::HubError;

/// One encoded frame on its way to a client. Shared between every
/// recipient of the same broadcast; cloning only bumps a refcount.
pub type Frame = Bytes;

/// The receiving end of a client's outbound queue.
pub type OutboundQueue = mpsc::Receiver<Frame>;

/// What a connection gets back from [`HubHandle::register`].
#[derive(Debug)]
pub struct Registration {
    /// The identifier the hub assigned.
    pub id: ClientId,
    /// Frames the hub wants written to this client. Yields `None` once
    /// the hub has unregistered the client or shut down.
    pub outbound: OutboundQueue,
}

/// Counters describing the hub as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct HubStats {
    pub clients: usize,
    pub lobbies: usize,
    pub ticks: u64,
    /// Lateness and work-time figures for the snapshot broadcast.
    pub tick_metrics: TickMetrics,
}

/// A lobby as the hub currently sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbySnapshot {
    pub info: LobbyInfo,
    pub entity_count: usize,
}

/// Per-client bookkeeping as the hub currently sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSnapshot {
    pub id: ClientId,
    /// Code of the lobby the client is in, if any.
    pub lobby: Option<String>,
    /// Sequence number of the most recent INPUT, in arrival order.
    pub last_input_seq: Option<i64>,
}

/// Commands sent to the hub actor through its channel.
///
/// Processed strictly one at a time in arrival order. Variants carrying
/// a `oneshot::Sender` expect an answer; the rest are fire-and-forget and
/// report failures to the client as ERROR frames.
pub(crate) enum HubCommand {
    Register {
        reply: oneshot::Sender<Registration>,
    },
    Unregister {
        id: ClientId,
    },
    Join {
        id: ClientId,
        lobby: String,
        name: String,
    },
    SelectRole {
        id: ClientId,
        role: String,
    },
    Input {
        id: ClientId,
        input: InputCommand,
    },
    Stats {
        reply: oneshot::Sender<HubStats>,
    },
    Lobby {
        code: String,
        reply: oneshot::Sender<Option<LobbySnapshot>>,
    },
    Client {
        id: ClientId,
        reply: oneshot::Sender<Option<ClientSnapshot>>,
    },
}

/// Handle to the running hub. Cheap to clone; every connection task
/// holds one.
///
/// The hub runs for as long as any handle exists.
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    pub(crate) fn new(sender: mpsc::Sender<HubCommand>) -> Self {
        Self { sender }
    }

    async fn send(&self, cmd: HubCommand) -> Result<(), HubError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| HubError::Unavailable)
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<T>) -> HubCommand,
    ) -> Result<T, HubError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(make(reply_tx)).await?;
        reply_rx.await.map_err(|_| HubError::Unavailable)
    }

    /// Registers a new connection. Returns its identifier and the queue
    /// its outbound pump drains.
    pub async fn register(&self) -> Result<Registration, HubError> {
        self.request(|reply| HubCommand::Register { reply }).await
    }

    /// Removes a client from the hub and from its lobby. Safe to call
    /// more than once.
    pub async fn unregister(&self, id: ClientId) -> Result<(), HubError> {
        self.send(HubCommand::Unregister { id }).await
    }

    /// Asks to put `id` into lobby `lobby` under display name `name`.
    pub async fn join(
        &self,
        id: ClientId,
        lobby: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<(), HubError> {
        self.send(HubCommand::Join {
            id,
            lobby: lobby.into(),
            name: name.into(),
        })
        .await
    }

    /// Asks to give `id` the role spelled `role` in its current lobby.
    pub async fn select_role(
        &self,
        id: ClientId,
        role: impl Into<String>,
    ) -> Result<(), HubError> {
        self.send(HubCommand::SelectRole {
            id,
            role: role.into(),
        })
        .await
    }

    /// Records a client's input sample.
    pub async fn input(
        &self,
        id: ClientId,
        input: InputCommand,
    ) -> Result<(), HubError> {
        self.send(HubCommand::Input { id, input }).await
    }

    pub async fn stats(&self) -> Result<HubStats, HubError> {
        self.request(|reply| HubCommand::Stats { reply }).await
    }

    /// Looks up a lobby by code. `None` if no such lobby exists.
    pub async fn lobby(
        &self,
        code: impl Into<String>,
    ) -> Result<Option<LobbySnapshot>, HubError> {
        let code = code.into();
        self.request(|reply| HubCommand::Lobby { code, reply }).await
    }

    /// Looks up a registered client. `None` if it is not registered.
    pub async fn client(
        &self,
        id: ClientId,
    ) -> Result<Option<ClientSnapshot>, HubError> {
        self.request(|reply| HubCommand::Client { id, reply }).await
    }
}
