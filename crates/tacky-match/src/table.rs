//! Match table: every match the coordinator has started.

use std::collections::HashMap;
use std::sync::Arc;

use tacky_protocol::{MatchId, Reply, Request, SessionId};
use tokio::sync::Mutex;

use crate::{Board, MatchError, MatchLogic};

/// The match table as shared between the coordinator and the connection
/// handlers.
pub type SharedMatches = Arc<Mutex<MatchTable>>;

/// Two paired sessions and their board.
#[derive(Debug, Clone)]
pub struct Match {
    /// The match's unique ID.
    pub id: MatchId,
    /// The requester first, then the opponent found in the pool.
    pub players: [SessionId; 2],
    /// Game state owned by the match's [`MatchLogic`].
    pub board: Board,
}

/// Tracks matches by id.
#[derive(Debug, Default)]
pub struct MatchTable {
    matches: HashMap<MatchId, Match>,
    last_id: u64,
}

impl MatchTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty table wrapped for sharing between tasks.
    pub fn shared() -> SharedMatches {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Reserves the next match id.
    pub fn next_id(&mut self) -> MatchId {
        self.last_id += 1;
        MatchId(self.last_id)
    }

    /// Records a new match with a board from `G`.
    pub fn start<G: MatchLogic>(&mut self, id: MatchId, players: [SessionId; 2]) -> &Match {
        let board = G::new_board(&players);
        tracing::info!(match_id = %id, a = %players[0], b = %players[1], "match started");
        self.matches
            .entry(id)
            .or_insert(Match { id, players, board })
    }

    /// Looks up a match.
    pub fn get(&self, id: MatchId) -> Option<&Match> {
        self.matches.get(&id)
    }

    /// Routes a command from `sender` to its match's logic.
    ///
    /// # Errors
    /// - [`MatchError::NotFound`] if the match doesn't exist
    /// - [`MatchError::NotInMatch`] if `sender` isn't one of its players
    pub fn route<G: MatchLogic>(
        &mut self,
        id: MatchId,
        sender: SessionId,
        request: &Request,
    ) -> Result<Vec<(SessionId, Reply)>, MatchError> {
        let m = self.matches.get_mut(&id).ok_or(MatchError::NotFound(id))?;
        if !m.players.contains(&sender) {
            return Err(MatchError::NotInMatch(sender, id));
        }
        Ok(G::handle_command(&mut m.board, &m.players, sender, request))
    }

    /// Returns the number of matches ever started.
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    /// Returns `true` if no match was ever started.
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoRules, Tile};

    /// Echoes every command back to the opponent and marks a cross.
    struct Echo;

    impl MatchLogic for Echo {
        fn new_board(_players: &[SessionId; 2]) -> Board {
            Board::empty(1, 1)
        }

        fn handle_command(
            board: &mut Board,
            players: &[SessionId; 2],
            sender: SessionId,
            request: &Request,
        ) -> Vec<(SessionId, Reply)> {
            board.tiles[0][0] = Tile::Cross;
            let to = if players[0] == sender { players[1] } else { players[0] };
            vec![(to, Reply::Text(request.body.clone()))]
        }
    }

    #[test]
    fn test_next_id_is_monotonic() {
        let mut table = MatchTable::new();
        assert_eq!(table.next_id(), MatchId(1));
        assert_eq!(table.next_id(), MatchId(2));
    }

    #[test]
    fn test_start_uses_logic_board() {
        let mut table = MatchTable::new();
        let id = table.next_id();

        let m = table.start::<Echo>(id, [SessionId(1), SessionId(2)]);

        assert_eq!(m.board, Board::empty(1, 1));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_route_no_rules_returns_nothing() {
        let mut table = MatchTable::new();
        let id = table.next_id();
        table.start::<NoRules>(id, [SessionId(1), SessionId(2)]);

        let out = table
            .route::<NoRules>(id, SessionId(2), &Request::parse("move 1").unwrap())
            .unwrap();

        assert!(out.is_empty());
    }

    #[test]
    fn test_route_delivers_logic_output_and_mutates_board() {
        let mut table = MatchTable::new();
        let id = table.next_id();
        table.start::<Echo>(id, [SessionId(1), SessionId(2)]);

        let out = table
            .route::<Echo>(id, SessionId(1), &Request::parse("say hi").unwrap())
            .unwrap();

        assert_eq!(out, vec![(SessionId(2), Reply::Text("hi".into()))]);
        assert_eq!(table.get(id).unwrap().board.get(0, 0), Some(Tile::Cross));
    }

    #[test]
    fn test_route_from_outsider_is_rejected() {
        let mut table = MatchTable::new();
        let id = table.next_id();
        table.start::<NoRules>(id, [SessionId(1), SessionId(2)]);

        let result = table.route::<NoRules>(id, SessionId(3), &Request::parse("x y").unwrap());

        assert!(matches!(result, Err(MatchError::NotInMatch(SessionId(3), _))));
    }

    #[test]
    fn test_route_unknown_match_returns_not_found() {
        let mut table = MatchTable::new();
        let result = table.route::<NoRules>(MatchId(7), SessionId(1), &Request::parse("x y").unwrap());
        assert!(matches!(result, Err(MatchError::NotFound(MatchId(7)))));
    }
}
