//! # Tacky
//!
//! A line-based TCP front-end that onboards players, tracks each
//! connection's session state, and pairs two players into a match when
//! both ask to play.
//!
//! Clients speak plain text: `name <text>` to introduce themselves, then
//! `play` to enter matchmaking. Game rules are not part of Tacky; they
//! plug in through the [`MatchLogic`](tacky_match::MatchLogic) trait.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tacky::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), TackyError> {
//!     let server = TackyServerBuilder::new()
//!         .bind("0.0.0.0:8081")
//!         .build::<NoRules>()
//!         .await?;
//!     server.run().await
//! }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{
    DEFAULT_BIND_ADDR, DEFAULT_OUTBOUND_CAPACITY, MIN_OUTBOUND_CAPACITY,
    ServerConfig,
};
pub use error::TackyError;
pub use server::{TackyServer, TackyServerBuilder};

/// Everything needed to run a server or write match logic.
pub mod prelude {
    pub use crate::{ServerConfig, TackyError, TackyServer, TackyServerBuilder};
    pub use tacky_match::{Board, Match, MatchLogic, NoRules, Tile};
    pub use tacky_protocol::{MatchId, Reply, Request, SessionId};
    pub use tacky_session::SessionState;
}
