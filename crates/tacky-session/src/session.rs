//! Session types and the per-session state machine.
//!
//! A "session" is the server's record of one connected client. It tracks:
//! - WHO the client is (`SessionId`, display name)
//! - WHAT state they're in (introducing themselves, in the lobby, ...)
//! - WHERE their outbound lines go (a bounded queue drained by the
//!   connection's write task)

use std::fmt;

use tacky_protocol::{Command, MatchId, ProtocolError, Reply, Request, SessionId};
use tokio::sync::mpsc;

/// Sending side of a session's outbound queue.
pub type OutboundSender = mpsc::Sender<Reply>;

/// Receiving side of a session's outbound queue, owned by the write task.
pub type OutboundReceiver = mpsc::Receiver<Reply>;

/// Creates a bounded outbound queue for one session.
///
/// When the queue is full, whoever is pushing a reply waits until the
/// write task has drained a slot.
pub fn outbound_channel(capacity: usize) -> (OutboundSender, OutboundReceiver) {
    mpsc::channel(capacity)
}

// ---------------------------------------------------------------------------
// SessionState
// ---------------------------------------------------------------------------

/// The current state of a session.
///
/// ```text
/// Introduction ──name──→ Lobby ──play──→ SearchingForMatch ──paired──→ Playing
///       │                  │                     │                        │
///       └──────────────────┴─────(connection lost)┴────────────────────────┘
///                                        ↓
///                                  Disconnected
/// ```
///
/// Every transition except `SearchingForMatch → Playing` is driven by the
/// session's own input. The pairing transition belongs to the matchmaking
/// coordinator, and `Disconnected` is set when the read task ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Connected, waiting for `name <text>`.
    Introduction,
    /// Named, waiting for `play`.
    Lobby,
    /// Waiting in the matchmaking pool.
    SearchingForMatch,
    /// Paired with an opponent.
    Playing,
    /// The connection is gone. Terminal.
    Disconnected,
}

impl SessionState {
    /// Returns `true` if the session is in the matchmaking pool.
    pub fn is_searching(&self) -> bool {
        matches!(self, Self::SearchingForMatch)
    }

    /// Returns `true` while the connection is still open.
    pub fn is_connected(&self) -> bool {
        !matches!(self, Self::Disconnected)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Introduction => write!(f, "Introduction"),
            Self::Lobby => write!(f, "Lobby"),
            Self::SearchingForMatch => write!(f, "SearchingForMatch"),
            Self::Playing => write!(f, "Playing"),
            Self::Disconnected => write!(f, "Disconnected"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// What the caller must do after the state machine handled a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Nothing beyond sending the replies.
    None,
    /// Submit this session to the matchmaking request queue.
    RequestMatch,
    /// Forward the request to the session's match.
    MatchInput(MatchId, Request),
}

/// The outcome of [`Session::handle`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    /// Replies for this session, in order.
    pub replies: Vec<Reply>,
    /// Follow-up work for the caller.
    pub action: Action,
}

impl Dispatch {
    fn silent() -> Self {
        Self {
            replies: Vec::new(),
            action: Action::None,
        }
    }

    fn reply(replies: Vec<Reply>) -> Self {
        Self {
            replies,
            action: Action::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// A single client's session.
///
/// Created when a connection is accepted and appended to the
/// [`Registry`](crate::Registry). Never destroyed: a closed connection
/// leaves the session behind in the `Disconnected` state.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    name: String,
    state: SessionState,
    outbound: OutboundSender,
    match_id: Option<MatchId>,
}

impl Session {
    pub(crate) fn new(id: SessionId, outbound: OutboundSender) -> Self {
        Self {
            id,
            name: String::new(),
            state: SessionState::Introduction,
            outbound,
            match_id: None,
        }
    }

    /// Returns the session's id.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Returns the display name. Empty until `name <text>` is handled.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the match this session is playing in, if any.
    pub fn match_id(&self) -> Option<MatchId> {
        self.match_id
    }

    /// Returns a handle to this session's outbound queue.
    pub fn outbound(&self) -> &OutboundSender {
        &self.outbound
    }

    /// Advances the state machine with one decoded line.
    ///
    /// Malformed lines get exactly one `NotUnderstood` reply and never
    /// change state. Well-formed commands that the current state doesn't
    /// handle are ignored without a reply.
    pub fn handle(&mut self, decoded: Result<Request, ProtocolError>) -> Dispatch {
        if !self.state.is_connected() {
            return Dispatch::silent();
        }

        let request = match decoded {
            Ok(request) => request,
            Err(e) => {
                tracing::debug!(session_id = %self.id, error = %e, "malformed line");
                return Dispatch::reply(vec![Reply::NotUnderstood]);
            }
        };

        match self.state {
            SessionState::Introduction => match request.command() {
                Command::Name(name) => {
                    self.name = name.to_string();
                    self.state = SessionState::Lobby;
                    tracing::info!(session_id = %self.id, name = %self.name, "entered lobby");
                    Dispatch::reply(vec![
                        Reply::Hello {
                            name: self.name.clone(),
                        },
                        Reply::LobbyWelcome,
                    ])
                }
                _ => Dispatch::silent(),
            },

            SessionState::Lobby => match request.command() {
                Command::Play => {
                    self.state = SessionState::SearchingForMatch;
                    tracing::info!(session_id = %self.id, "searching for a match");
                    Dispatch {
                        replies: vec![Reply::Searching],
                        action: Action::RequestMatch,
                    }
                }
                _ => Dispatch::silent(),
            },

            // Only the coordinator moves a searching session forward.
            SessionState::SearchingForMatch => Dispatch::silent(),

            SessionState::Playing => match self.match_id {
                Some(match_id) => Dispatch {
                    replies: Vec::new(),
                    action: Action::MatchInput(match_id, request),
                },
                None => {
                    tracing::warn!(session_id = %self.id, "playing without a match id");
                    Dispatch::silent()
                }
            },

            SessionState::Disconnected => Dispatch::silent(),
        }
    }

    pub(crate) fn start_playing(&mut self, match_id: MatchId) {
        self.state = SessionState::Playing;
        self.match_id = Some(match_id);
    }

    pub(crate) fn mark_disconnected(&mut self) -> SessionState {
        std::mem::replace(&mut self.state, SessionState::Disconnected)
    }
}
