//! The session registry: every session the process has ever accepted.
//!
//! The registry is append-only and ordered by accept time. Matchmaking
//! scans it front to back, so the oldest eligible session always wins a
//! pairing.
//!
//! # Concurrency note
//!
//! `Registry` is NOT thread-safe by itself. It is shared as a
//! [`SharedRegistry`] (`Arc<Mutex<Registry>>`) and every caller holds the
//! lock only for an append, a transition, or a scan.

use std::collections::HashMap;
use std::sync::Arc;

use tacky_protocol::{MatchId, SessionId};
use tokio::sync::Mutex;

use crate::{OutboundSender, Session, SessionError, SessionState};

/// The registry as shared between the accept loop, connection handlers,
/// and the matchmaking coordinator.
pub type SharedRegistry = Arc<Mutex<Registry>>;

/// One side of a freshly made pairing: what the coordinator needs to
/// notify a player after releasing the registry lock.
#[derive(Debug, Clone)]
pub struct Seat {
    pub id: SessionId,
    pub name: String,
    pub outbound: OutboundSender,
}

/// Ordered, append-only collection of sessions.
///
/// ## Lifecycle of an entry
///
/// ```text
/// register() ──→ [Introduction] ─ ... ─→ [SearchingForMatch]
///                                              │
///                                   begin_match() (coordinator)
///                                              ▼
///                                          [Playing]
///
/// disconnect() from any state ──→ [Disconnected] (kept, never matched)
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    /// Sessions in accept order.
    sessions: Vec<Session>,
    /// Position of each session in `sessions`.
    index: HashMap<SessionId, usize>,
    /// Last id handed out. Ids start at 1 and only go up.
    last_id: u64,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry wrapped for sharing between tasks.
    pub fn shared() -> SharedRegistry {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Appends a new session in `Introduction` and returns its id.
    ///
    /// Ids come from a monotonic counter, so they are unique for the
    /// lifetime of the registry.
    pub fn register(&mut self, outbound: OutboundSender) -> SessionId {
        self.last_id += 1;
        let id = SessionId(self.last_id);

        self.index.insert(id, self.sessions.len());
        self.sessions.push(Session::new(id, outbound));

        tracing::info!(session_id = %id, total = self.sessions.len(), "session created");
        id
    }

    /// Looks up a session by id.
    pub fn get(&self, id: SessionId) -> Option<&Session> {
        self.index.get(&id).map(|&pos| &self.sessions[pos])
    }

    /// Looks up a session by id for mutation.
    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut Session> {
        self.index.get(&id).map(|&pos| &mut self.sessions[pos])
    }

    /// Finds the first session (in accept order) that is searching for a
    /// match and is not `requester`.
    pub fn find_opponent(&self, requester: SessionId) -> Option<SessionId> {
        self.sessions
            .iter()
            .find(|s| s.state().is_searching() && s.id() != requester)
            .map(Session::id)
    }

    /// Moves two searching sessions to `Playing` in the given match.
    ///
    /// Both sessions are checked before either is touched, so on error the
    /// registry is unchanged.
    ///
    /// # Errors
    /// - [`SessionError::SelfMatch`] if `a == b`
    /// - [`SessionError::NotFound`] if either id is unknown
    /// - [`SessionError::NotSearching`] if either session left the pool
    pub fn begin_match(
        &mut self,
        a: SessionId,
        b: SessionId,
        match_id: MatchId,
    ) -> Result<(Seat, Seat), SessionError> {
        if a == b {
            return Err(SessionError::SelfMatch(a));
        }
        for id in [a, b] {
            let session = self.get(id).ok_or(SessionError::NotFound(id))?;
            if !session.state().is_searching() {
                return Err(SessionError::NotSearching(id, session.state()));
            }
        }

        let seat_a = self.seat_for_match(a, match_id)?;
        let seat_b = self.seat_for_match(b, match_id)?;
        Ok((seat_a, seat_b))
    }

    fn seat_for_match(
        &mut self,
        id: SessionId,
        match_id: MatchId,
    ) -> Result<Seat, SessionError> {
        let session = self.get_mut(id).ok_or(SessionError::NotFound(id))?;
        session.start_playing(match_id);
        Ok(Seat {
            id,
            name: session.name().to_string(),
            outbound: session.outbound().clone(),
        })
    }

    /// Marks a session `Disconnected`, removing it from the matchmaking
    /// pool. The entry itself stays in the registry.
    ///
    /// Returns the state the session was in before.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if the id is unknown.
    pub fn disconnect(&mut self, id: SessionId) -> Result<SessionState, SessionError> {
        let session = self.get_mut(id).ok_or(SessionError::NotFound(id))?;
        let previous = session.mark_disconnected();
        tracing::info!(session_id = %id, %previous, "session disconnected");
        Ok(previous)
    }

    /// Iterates over the sessions currently waiting for an opponent, in
    /// accept order.
    pub fn searching(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter().filter(|s| s.state().is_searching())
    }

    /// Returns the number of sessions ever registered.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no session was ever registered.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
