//! Matchmaking for Tacky.
//!
//! A single coordinator task pairs sessions that asked to play. Each pair
//! becomes a [`Match`] whose behavior is supplied by a [`MatchLogic`]
//! implementation.
//!
//! # Key types
//!
//! - [`MatchQueue`] — submit "this session wants a match" requests
//! - [`Coordinator`] — the actor that drains the queue and pairs sessions
//! - [`MatchTable`] — every match started so far
//! - [`MatchLogic`] — the extension point for game rules ([`NoRules`] by
//!   default)

mod coordinator;
mod error;
mod logic;
mod table;

pub use coordinator::{
    Coordinator, MatchQueue, MatchRequests, Outcome, REQUEST_QUEUE_CAPACITY,
    request_queue, spawn_coordinator,
};
pub use error::MatchError;
pub use logic::{Board, MatchLogic, NoRules, Tile};
pub use table::{Match, MatchTable, SharedMatches};
