//! Per-connection handler: greeting, read loop, write task, cleanup.
//!
//! Each accepted connection gets its own Tokio task running
//! [`handle_connection`]. The flow is:
//!   1. Spawn the write task, which drains the session's outbound queue
//!   2. Queue the welcome lines
//!   3. Loop: read a line → decode → run the session state machine →
//!      queue replies → submit to matchmaking or route to the match
//!   4. On end of stream or read error: mark the session `Disconnected`,
//!      let the write task flush what is already queued, then close

use std::sync::Arc;

use tacky_match::MatchLogic;
use tacky_protocol::{Codec, MatchId, Reply, Request, SessionId};
use tacky_session::{Action, OutboundReceiver, OutboundSender, SessionError};
use tacky_transport::{Connection, TcpLineConnection};
use tokio::sync::oneshot;

use crate::server::ServerState;
use crate::TackyError;

/// Most replies one request line can produce (`name` → greeting + lobby
/// welcome).
const MAX_REPLIES_PER_LINE: usize = 2;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<G, C>(
    conn: TcpLineConnection,
    session_id: SessionId,
    outbound: OutboundSender,
    outbound_rx: OutboundReceiver,
    state: Arc<ServerState<G, C>>,
) -> Result<(), TackyError>
where
    G: MatchLogic,
    C: Codec + Clone,
{
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    tracing::debug!(%conn_id, %session_id, peer = %conn.peer_addr(), "handling new connection");

    // Dropping `shutdown_tx` on any exit path below also starts the
    // writer's final drain.
    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    let writer = tokio::spawn(write_loop(
        Arc::clone(&conn),
        session_id,
        outbound_rx,
        shutdown_rx,
        state.codec.clone(),
    ));

    let result = if greet(&outbound).await {
        read_loop(&conn, session_id, &outbound, &state).await
    } else {
        Ok(())
    };

    if let Err(e) = state.registry.lock().await.disconnect(session_id) {
        tracing::error!(%session_id, error = %e, "disconnect of unregistered session");
    }

    let _ = shutdown_tx.send(());
    if let Err(e) = writer.await {
        tracing::warn!(%session_id, error = %e, "write task failed");
    }
    if let Err(e) = conn.close().await {
        tracing::debug!(%session_id, error = %e, "close failed");
    }

    tracing::info!(%conn_id, %session_id, "connection finished");
    result
}

/// Queues the welcome lines. Returns `false` if the writer is already gone.
async fn greet(outbound: &OutboundSender) -> bool {
    for reply in [Reply::Welcome, Reply::AskName] {
        if outbound.send(reply).await.is_err() {
            return false;
        }
    }
    true
}

/// Reads lines until end of stream, driving the session state machine.
async fn read_loop<G, C>(
    conn: &TcpLineConnection,
    session_id: SessionId,
    outbound: &OutboundSender,
    state: &Arc<ServerState<G, C>>,
) -> Result<(), TackyError>
where
    G: MatchLogic,
    C: Codec,
{
    loop {
        let line = match conn.recv_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                tracing::info!(%session_id, "connection closed by peer");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%session_id, error = %e, "recv error");
                return Err(e.into());
            }
        };

        let decoded = state.codec.decode(&line);

        // Reserve queue slots before locking, so the registry lock is never
        // held while waiting on this session's writer.
        let Ok(permits) = outbound.reserve_many(MAX_REPLIES_PER_LINE).await else {
            tracing::debug!(%session_id, "write task gone, stopping reader");
            return Ok(());
        };

        // Replies are queued while the registry is still locked: the
        // coordinator can't see a new state (and queue a start notice)
        // before the acknowledgement for that state is in the queue.
        let action = {
            let mut registry = state.registry.lock().await;
            let session = registry
                .get_mut(session_id)
                .ok_or(SessionError::NotFound(session_id))?;
            let dispatch = session.handle(decoded);
            for (permit, reply) in permits.zip(dispatch.replies) {
                permit.send(reply);
            }
            dispatch.action
        };

        match action {
            Action::None => {}
            Action::RequestMatch => {
                // Blocks while another request waits for the coordinator.
                state.queue.submit(session_id).await?;
            }
            Action::MatchInput(match_id, request) => {
                route_match_input(state, session_id, match_id, &request).await;
            }
        }
    }
}

/// Forwards a command from a playing session to its match logic and
/// queues whatever the logic produced.
async fn route_match_input<G, C>(
    state: &Arc<ServerState<G, C>>,
    session_id: SessionId,
    match_id: MatchId,
    request: &Request,
) where
    G: MatchLogic,
    C: Codec,
{
    let routed = state
        .matches
        .lock()
        .await
        .route::<G>(match_id, session_id, request);

    let outputs = match routed {
        Ok(outputs) => outputs,
        Err(e) => {
            tracing::warn!(%session_id, %match_id, error = %e, "match input dropped");
            return;
        }
    };

    for (recipient, reply) in outputs {
        let sender = state
            .registry
            .lock()
            .await
            .get(recipient)
            .map(|s| s.outbound().clone());
        match sender {
            Some(sender) => {
                if sender.send(reply).await.is_err() {
                    tracing::debug!(%recipient, "match output dropped, writer closed");
                }
            }
            None => tracing::warn!(%recipient, %match_id, "match output for unknown session"),
        }
    }
}

/// Delivers queued replies to the socket until shutdown.
///
/// The shutdown signal (sent or dropped) closes the queue to new replies;
/// whatever was already queued is still written before the loop ends. A
/// write error ends it at once, as does every sender going away.
async fn write_loop<C: Codec>(
    conn: Arc<TcpLineConnection>,
    session_id: SessionId,
    mut outbound: OutboundReceiver,
    mut shutdown: oneshot::Receiver<()>,
    codec: C,
) {
    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown => {
                tracing::debug!(%session_id, "write task draining");
                outbound.close();
                while let Some(reply) = outbound.recv().await {
                    if !deliver(&conn, session_id, &codec, &reply).await {
                        break;
                    }
                }
                break;
            }

            reply = outbound.recv() => {
                let Some(reply) = reply else { break };
                if !deliver(&conn, session_id, &codec, &reply).await {
                    break;
                }
            }
        }
    }
    tracing::debug!(%session_id, "write task finished");
}

/// Writes one reply. Returns `false` once the socket is unusable.
async fn deliver<C: Codec>(
    conn: &TcpLineConnection,
    session_id: SessionId,
    codec: &C,
    reply: &Reply,
) -> bool {
    let line = codec.encode(reply);
    match conn.send_line(&line).await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(%session_id, error = %e, "send failed");
            false
        }
    }
}
