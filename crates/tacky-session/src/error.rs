//! Error types for the session layer.

use tacky_protocol::SessionId;

use crate::SessionState;

/// Errors that can occur while looking up or transitioning sessions.
///
/// None of these are caused by client input: a malformed line is a
/// protocol matter handled inside the state machine. These errors mean
/// the registry was asked to do something its bookkeeping says is
/// impossible.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No session exists with this id.
    /// Ids are never removed, so this only happens for ids the registry
    /// never handed out.
    #[error("session {0} not found")]
    NotFound(SessionId),

    /// The session is not in `SearchingForMatch` and cannot be paired.
    #[error("session {0} is not searching for a match (state: {1})")]
    NotSearching(SessionId, SessionState),

    /// A session cannot be paired with itself.
    #[error("session {0} cannot be matched against itself")]
    SelfMatch(SessionId),
}
