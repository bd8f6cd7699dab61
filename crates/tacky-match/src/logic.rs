//! The `MatchLogic` trait: the extension point for actual game rules.
//!
//! Tacky pairs players; it does not know how to play anything. Board
//! size, turn order, move validation and win detection all belong to an
//! implementation of this trait. Every method has an empty default, so
//! [`NoRules`] is a complete (if silent) implementation.

use serde::{Deserialize, Serialize};
use tacky_protocol::{Reply, Request, SessionId};

/// The contents of one board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tile {
    #[default]
    Empty,
    Cross,
    Nought,
}

/// A grid of tiles.
///
/// The default board has no rows at all: its shape is decided by whichever
/// [`MatchLogic`] creates it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Board {
    pub tiles: Vec<Vec<Tile>>,
}

impl Board {
    /// Creates a `rows` × `cols` board of empty tiles.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            tiles: vec![vec![Tile::Empty; cols]; rows],
        }
    }

    /// Returns the tile at `(row, col)`, if it exists.
    pub fn get(&self, row: usize, col: usize) -> Option<Tile> {
        self.tiles.get(row).and_then(|r| r.get(col)).copied()
    }
}

/// Rules for a two-player match.
///
/// Methods are associated functions (no `self`): the server is generic over
/// the logic type and never holds an instance of it.
pub trait MatchLogic: Send + Sync + 'static {
    /// Creates the board for a newly paired match.
    ///
    /// `players[0]` is the session whose request triggered the pairing,
    /// `players[1]` the opponent found in the pool.
    fn new_board(_players: &[SessionId; 2]) -> Board {
        Board::default()
    }

    /// Handles a command from one of the match's players.
    ///
    /// Returns the replies to deliver, each addressed to a session.
    fn handle_command(
        _board: &mut Board,
        _players: &[SessionId; 2],
        _sender: SessionId,
        _request: &Request,
    ) -> Vec<(SessionId, Reply)> {
        Vec::new()
    }
}

/// A [`MatchLogic`] with no rules: commands are accepted and nothing
/// happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRules;

impl MatchLogic for NoRules {}
