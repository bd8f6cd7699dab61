//! Matchmaking coordinator: a single Tokio task that pairs sessions.
//!
//! Connection handlers submit "this session wants a match" requests to a
//! [`MatchQueue`]. The queue holds at most ONE request, and exactly one
//! coordinator task drains it, so pairing decisions happen strictly one
//! at a time in dequeue order. This is the "actor model" again: the
//! coordinator owns the decision, handlers only send it messages.

use std::marker::PhantomData;

use tacky_protocol::{MatchId, Reply, SessionId};
use tacky_session::{Seat, SharedRegistry};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;

use crate::{MatchError, MatchLogic, SharedMatches};

/// Capacity of the matchmaking request queue.
///
/// One slot makes the queue a rendezvous point: a second submission waits
/// until the coordinator has picked up the first.
pub const REQUEST_QUEUE_CAPACITY: usize = 1;

/// Handle for submitting matchmaking requests. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MatchQueue {
    sender: mpsc::Sender<SessionId>,
}

impl MatchQueue {
    /// Submits `session_id` to the coordinator.
    ///
    /// Waits while the queue is full.
    ///
    /// # Errors
    /// Returns [`MatchError::QueueClosed`] if the coordinator has stopped.
    pub async fn submit(&self, session_id: SessionId) -> Result<(), MatchError> {
        self.sender
            .send(session_id)
            .await
            .map_err(|_| MatchError::QueueClosed)
    }
}

/// Receiving side of the request queue, consumed by the coordinator.
#[derive(Debug)]
pub struct MatchRequests {
    receiver: mpsc::Receiver<SessionId>,
}

impl MatchRequests {
    /// Waits for the next request. `None` once every [`MatchQueue`] is gone.
    pub async fn next(&mut self) -> Option<SessionId> {
        self.receiver.recv().await
    }
}

/// Creates the request queue with [`REQUEST_QUEUE_CAPACITY`].
pub fn request_queue() -> (MatchQueue, MatchRequests) {
    let (sender, receiver) = mpsc::channel(REQUEST_QUEUE_CAPACITY);
    (MatchQueue { sender }, MatchRequests { receiver })
}

/// What happened to one matchmaking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The requester was paired with `opponent` in `match_id`.
    Paired {
        match_id: MatchId,
        requester: SessionId,
        opponent: SessionId,
    },
    /// Nobody else is searching; the requester waits in the pool.
    NoOpponent,
    /// The requester already left the pool (paired by a later request,
    /// or disconnected) before this request was dequeued.
    Stale,
    /// The registry has no session with this id.
    UnknownSession,
    /// Registry bookkeeping refused the pairing.
    Rejected,
}

/// The coordinator actor.
pub struct Coordinator<G: MatchLogic> {
    registry: SharedRegistry,
    matches: SharedMatches,
    requests: MatchRequests,
    _logic: PhantomData<fn() -> G>,
}

impl<G: MatchLogic> Coordinator<G> {
    /// Creates a coordinator that drains `requests`.
    pub fn new(
        registry: SharedRegistry,
        matches: SharedMatches,
        requests: MatchRequests,
    ) -> Self {
        Self {
            registry,
            matches,
            requests,
            _logic: PhantomData,
        }
    }

    /// Runs the actor loop until every [`MatchQueue`] is dropped.
    pub async fn run(mut self) {
        tracing::info!("matchmaking coordinator started");

        while let Some(session_id) = self.requests.next().await {
            let outcome = self.process(session_id).await;
            tracing::debug!(%session_id, ?outcome, "matchmaking request handled");
        }

        tracing::info!("matchmaking coordinator stopped");
    }

    /// Handles one request: scan the pool, pair, notify.
    ///
    /// Only waits on the registry and match-table locks, never on a
    /// session's outbound queue.
    ///
    /// Never panics on inconsistent bookkeeping; such cases are logged and
    /// the request is dropped.
    pub async fn process(&mut self, requester: SessionId) -> Outcome {
        let (match_id, seats) = {
            let mut registry = self.registry.lock().await;

            match registry.get(requester) {
                None => {
                    tracing::error!(
                        session_id = %requester,
                        "matchmaking request for unknown session"
                    );
                    return Outcome::UnknownSession;
                }
                Some(session) if !session.state().is_searching() => {
                    tracing::debug!(
                        session_id = %requester,
                        state = %session.state(),
                        "stale matchmaking request"
                    );
                    return Outcome::Stale;
                }
                Some(_) => {}
            }

            let Some(opponent) = registry.find_opponent(requester) else {
                tracing::info!(
                    session_id = %requester,
                    waiting = registry.searching().count(),
                    "no opponent available"
                );
                return Outcome::NoOpponent;
            };

            // Lock order: registry, then matches. Handlers never take them
            // the other way round.
            let mut matches = self.matches.lock().await;
            let match_id = matches.next_id();
            let seats = match registry.begin_match(requester, opponent, match_id) {
                Ok(seats) => seats,
                Err(e) => {
                    tracing::error!(
                        session_id = %requester,
                        %opponent,
                        error = %e,
                        "pairing rejected by registry"
                    );
                    return Outcome::Rejected;
                }
            };
            matches.start::<G>(match_id, [requester, opponent]);
            (match_id, seats)
        };

        let (seat_a, seat_b) = seats;
        notify(&seat_a, &seat_b);
        notify(&seat_b, &seat_a);

        Outcome::Paired {
            match_id,
            requester: seat_a.id,
            opponent: seat_b.id,
        }
    }
}

/// Queues the start-of-match notice for `seat`, naming `opponent`.
///
/// Never waits: a session whose queue is full (its client stopped reading)
/// loses the notice instead of stalling matchmaking for everyone else.
fn notify(seat: &Seat, opponent: &Seat) {
    let notice = Reply::MatchStarting {
        opponent: opponent.name.clone(),
    };
    match seat.outbound.try_send(notice) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => {
            tracing::warn!(session_id = %seat.id, "start notice dropped, outbound queue full");
        }
        Err(TrySendError::Closed(_)) => {
            // The write task is gone; the read side will mark it disconnected.
            tracing::debug!(session_id = %seat.id, "start notice dropped, writer closed");
        }
    }
}

/// Spawns the coordinator task and returns the queue feeding it.
pub fn spawn_coordinator<G: MatchLogic>(
    registry: SharedRegistry,
    matches: SharedMatches,
) -> (MatchQueue, JoinHandle<()>) {
    let (queue, requests) = request_queue();
    let coordinator = Coordinator::<G>::new(registry, matches, requests);
    let handle = tokio::spawn(coordinator.run());
    (queue, handle)
}
