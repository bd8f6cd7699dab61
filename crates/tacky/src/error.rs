//! Unified error type for the Tacky server.

use tacky_match::MatchError;
use tacky_session::SessionError;
use tacky_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// Malformed lines never surface here: the session answers them itself.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so the `?` operator converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TackyError {
    /// A transport-level error (accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A session-level error (unknown id, invalid transition).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A matchmaking error (queue closed, unknown match).
    #[error(transparent)]
    Match(#[from] MatchError),

    /// Reading a config file failed.
    #[error("config io: {0}")]
    Io(#[from] std::io::Error),

    /// A config file isn't valid JSON for [`ServerConfig`](crate::ServerConfig).
    #[error("config parse: {0}")]
    Config(#[from] serde_json::Error),

    /// A config value is out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
