//! Per-connection handler: registration and the two pumps.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register with the hub → client id + outbound queue
//!   2. Spawn the outbound pump: queue → socket, plus keepalive pings
//!   3. Run the inbound pump: socket → decode → hub command
//!   4. On exit, close the socket and unregister
//!
//! The pumps share a cancellation token. Whichever one stops first
//! cancels it, and the other stops too: a failed write ends the read
//! loop, and a failed read ends the write loop. The handler then closes
//! the socket under the write deadline and its guard unregisters the
//! client.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use spacehub_hub::{HubHandle, OutboundQueue, Registration};
use spacehub_protocol::{ClientId, ClientMessage, JsonCodec};
use spacehub_transport::{
    Connection, Inbound, TransportError, WebSocketConnection,
};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::SpacehubError;

/// Timing limits applied to every connection.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PumpSettings {
    pub(crate) read_timeout: Duration,
    pub(crate) write_timeout: Duration,
    pub(crate) keepalive_interval: Duration,
}

/// Drop guard that unregisters the client when the handler exits.
///
/// This ensures cleanup happens even if the handler panics. Since `Drop`
/// is synchronous, we spawn a fire-and-forget task for the send.
struct ClientGuard {
    id: ClientId,
    hub: HubHandle,
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        let id = self.id;
        let hub = self.hub.clone();
        tokio::spawn(async move {
            let _ = hub.unregister(id).await;
        });
    }
}

/// Handles a single connection from upgrade to close.
pub(crate) async fn handle_connection(
    conn: WebSocketConnection,
    hub: HubHandle,
    settings: PumpSettings,
) -> Result<(), SpacehubError> {
    let peer = conn.peer_addr();
    let conn = Arc::new(conn);

    let Registration { id, outbound } = hub.register().await?;
    let _guard = ClientGuard {
        id,
        hub: hub.clone(),
    };
    tracing::info!(client = %id, %peer, "client connected");

    let shutdown = CancellationToken::new();
    let writer = tokio::spawn(outbound_pump(
        Arc::clone(&conn),
        outbound,
        id,
        settings,
        shutdown.clone(),
    ));

    let read = tokio::select! {
        read = inbound_pump(conn.as_ref(), &hub, id, settings) => read,
        () = shutdown.cancelled() => Ok(()),
    };
    shutdown.cancel();

    let written = writer.await.unwrap_or_else(|e| {
        tracing::error!(client = %id, error = %e, "outbound pump panicked");
        Ok(())
    });

    match time::timeout(settings.write_timeout, conn.close()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            tracing::trace!(client = %id, error = %e, "close failed");
        }
        Err(_) => tracing::debug!(client = %id, "close timed out"),
    }
    tracing::info!(client = %id, "client disconnected");

    // _guard drops here → unregister fires.
    read.and(written.map_err(SpacehubError::from))
}

/// Reads frames until the peer leaves, the socket fails, or nothing
/// arrives for `read_timeout`. Every frame, probes included, restarts
/// the timeout.
async fn inbound_pump(
    conn: &WebSocketConnection,
    hub: &HubHandle,
    id: ClientId,
    settings: PumpSettings,
) -> Result<(), SpacehubError> {
    let codec = JsonCodec;

    loop {
        let data = match time::timeout(settings.read_timeout, conn.recv()).await
        {
            Ok(Ok(Some(Inbound::Message(data)))) => data,
            Ok(Ok(Some(Inbound::Probe))) => continue,
            Ok(Ok(None)) => {
                tracing::debug!(client = %id, "connection closed cleanly");
                return Ok(());
            }
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => {
                tracing::info!(client = %id, "connection timed out");
                return Err(TransportError::Timeout { operation: "read" }.into());
            }
        };

        let msg = match ClientMessage::decode(&codec, &data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    client = %id, error = %e, "dropping malformed message"
                );
                continue;
            }
        };
        tracing::trace!(client = %id, kind = msg.kind(), "message received");

        match msg {
            ClientMessage::Join(req) => {
                hub.join(id, req.lobby, req.player_name).await?;
            }
            ClientMessage::RoleSelect(req) => {
                hub.select_role(id, req.role).await?;
            }
            ClientMessage::Input(input) => hub.input(id, input).await?,
        }
    }
}

/// Writes queued frames and keepalive pings until the queue closes, a
/// write fails or misses its deadline, or the read side stops. Cancels
/// `shutdown` on the way out, whatever the reason.
async fn outbound_pump(
    conn: Arc<WebSocketConnection>,
    mut queue: OutboundQueue,
    id: ClientId,
    settings: PumpSettings,
    shutdown: CancellationToken,
) -> Result<(), TransportError> {
    let _stop_reader = shutdown.clone().drop_guard();

    let period = settings.keepalive_interval;
    let mut keepalive = time::interval_at(Instant::now() + period, period);
    keepalive.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let written = tokio::select! {
            () = shutdown.cancelled() => return Ok(()),
            frame = queue.recv() => match frame {
                Some(frame) => {
                    with_deadline(settings.write_timeout, "send", conn.send(frame)).await
                }
                None => {
                    tracing::debug!(client = %id, "outbound queue closed");
                    return Ok(());
                }
            },
            _ = keepalive.tick() => {
                with_deadline(settings.write_timeout, "ping", conn.ping()).await
            }
        };
        if let Err(e) = written {
            tracing::debug!(client = %id, error = %e, "write failed");
            return Err(e);
        }
    }
}

async fn with_deadline(
    limit: Duration,
    operation: &'static str,
    write: impl Future<Output = Result<(), TransportError>>,
) -> Result<(), TransportError> {
    time::timeout(limit, write)
        .await
        .map_err(|_| TransportError::Timeout { operation })?
}
