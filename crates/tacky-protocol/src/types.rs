//! Identifier types shared across the Tacky crates.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A unique identifier for a session (one connected client).
///
/// Newtype over `u64` so a `MatchId` can never be passed where a
/// `SessionId` is expected. Ids are handed out by the session registry
/// from a monotonic counter, which makes them unique for the lifetime of
/// the process without any collision check.
///
/// `#[serde(transparent)]` serializes `SessionId(42)` as plain `42`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
    Deserialize,
)]
#[serde(transparent)]
pub struct SessionId(pub u64);

/// Display lets us use `%session_id` in tracing fields.
impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// A unique identifier for a match between two sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchId(pub u64);

impl fmt::Display for MatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}
