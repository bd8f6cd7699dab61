//! Line protocol for Tacky.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Types** ([`SessionId`], [`MatchId`]) — identifiers shared by the
//!   session and matchmaking layers.
//! - **Requests** ([`Request`], [`Command`]) — one inbound text line split
//!   into a command token and a body.
//! - **Replies** ([`Reply`]) — the fixed set of server-to-client lines.
//! - **Codec** ([`Codec`] trait, [`LineCodec`]) — how requests and replies
//!   are converted to/from text lines.
//! - **Errors** ([`ProtocolError`]) — what can go wrong while decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw lines) and session
//! (per-connection state). It doesn't know about connections or
//! matchmaking — it only knows how to read and write lines.
//!
//! ```text
//! Transport (lines) → Protocol (Request / Reply) → Session (state machine)
//! ```

mod codec;
mod error;
mod reply;
mod request;
mod types;

pub use codec::{Codec, LineCodec};
pub use error::ProtocolError;
pub use reply::Reply;
pub use request::{Command, Request, BODYLESS_COMMANDS};
pub use types::{MatchId, SessionId};
