//! Session management for Tacky.
//!
//! This crate handles everything the server knows about one connected
//! client:
//!
//! 1. **State machine** — how a [`Session`] reacts to decoded requests
//!    ([`Session::handle`])
//! 2. **Registry** — the append-only, ordered record of every session
//!    ever created ([`Registry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Match Layer (above)  ← scans the registry for opponents, pairs sessions
//!     ↕
//! Session Layer (this crate)  ← per-connection state and the registry
//!     ↕
//! Protocol Layer (below)  ← provides SessionId, Request, Reply
//! ```

mod error;
mod registry;
mod session;

pub use error::SessionError;
pub use registry::{Registry, Seat, SharedRegistry};
pub use session::{
    Action, Dispatch, OutboundReceiver, OutboundSender, Session,
    SessionState, outbound_channel,
};
