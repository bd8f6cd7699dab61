//! Error types for the matchmaking layer.

use tacky_protocol::{MatchId, SessionId};

/// Errors that can occur during matchmaking or match routing.
#[derive(Debug, thiserror::Error)]
pub enum MatchError {
    /// The match does not exist.
    #[error("match {0} not found")]
    NotFound(MatchId),

    /// The session is not one of the match's players.
    #[error("session {0} is not playing in match {1}")]
    NotInMatch(SessionId, MatchId),

    /// The coordinator has stopped and no longer accepts requests.
    #[error("matchmaking request queue is closed")]
    QueueClosed,
}
