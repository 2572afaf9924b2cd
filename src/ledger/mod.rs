//! Round-based score ledger for a single room.
//!
//! The ledger owns the players of one room together with every round they
//! played. Totals are kept in step with the round history by every mutation,
//! and each operation either applies completely or leaves the ledger as it was.

pub mod export;
mod player;
mod round;
mod score;

use crate::types::*;

pub use export::{LedgerExport, EXPORT_SCHEMA_VERSION};
pub use round::parse_score;
pub use score::rank_badge;

/// Upper bound on recorded rounds per room
pub const MAX_ROUNDS: u32 = 10_000;

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Errors that can occur while mutating or loading a ledger
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid round {index} for player {player_id} ({len} rounds recorded)")]
    InvalidRoundIndex {
        player_id: PlayerId,
        index: usize,
        len: usize,
    },

    #[error("Player not found: {0}")]
    PlayerNotFound(PlayerId),

    #[error("Cannot record a round without players")]
    EmptyRoom,
}

/// Players and per-round scores for one room code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLedger {
    room_code: RoomCode,
    current_round: u32,
    players: Vec<Player>,
}

impl ScoreLedger {
    /// Create an empty ledger for the given room
    pub fn new(room_code: impl Into<RoomCode>) -> Self {
        Self {
            room_code: room_code.into(),
            current_round: 1,
            players: Vec::new(),
        }
    }

    pub fn room_code(&self) -> &str {
        &self.room_code
    }

    /// The next round number to be recorded (1-based)
    pub fn current_round(&self) -> u32 {
        self.current_round
    }

    /// Players in insertion order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Bind the ledger to another room code (imports, legacy blobs without a code)
    pub fn rebind_room(&mut self, room_code: impl Into<RoomCode>) {
        self.room_code = room_code.into();
    }

    fn player_mut(&mut self, player_id: &str) -> LedgerResult<&mut Player> {
        self.players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| LedgerError::PlayerNotFound(player_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn scores(entries: &[(&Player, i64)]) -> HashMap<PlayerId, i64> {
        entries.iter().map(|(p, s)| (p.id.clone(), *s)).collect()
    }

    fn totals(ledger: &ScoreLedger) -> Vec<(String, i64)> {
        ledger
            .leaderboard()
            .into_iter()
            .map(|e| (e.name, e.total_score))
            .collect()
    }

    fn assert_invariants(ledger: &ScoreLedger) {
        for player in ledger.players() {
            assert_eq!(player.total_score, player.rounds.iter().sum::<i64>());
        }
    }

    #[test]
    fn test_new_ledger_is_empty() {
        let ledger = ScoreLedger::new("ABC234");
        assert_eq!(ledger.room_code(), "ABC234");
        assert_eq!(ledger.current_round(), 1);
        assert!(ledger.is_empty());
        assert!(ledger.leaderboard().is_empty());
    }

    #[test]
    fn test_two_player_scenario() {
        let mut ledger = ScoreLedger::new("ROOM42");
        let alice = ledger.add_player("Alice").unwrap();
        let bob = ledger.add_player("Bob").unwrap();

        ledger.record_round(&scores(&[(&alice, 5), (&bob, 3)])).unwrap();
        assert_eq!(
            totals(&ledger),
            vec![("Alice".to_string(), 5), ("Bob".to_string(), 3)]
        );

        ledger
            .record_round(&scores(&[(&alice, 1), (&bob, 10)]))
            .unwrap();
        assert_eq!(
            totals(&ledger),
            vec![("Bob".to_string(), 13), ("Alice".to_string(), 6)]
        );

        let old = ledger.edit_round(&alice.id, 0, 9).unwrap();
        assert_eq!(old, 5);
        assert_eq!(
            totals(&ledger),
            vec![("Bob".to_string(), 13), ("Alice".to_string(), 10)]
        );
        assert_eq!(ledger.current_round(), 3);
        assert_invariants(&ledger);
    }

    #[test]
    fn test_rounds_stay_in_step_with_current_round() {
        let mut ledger = ScoreLedger::new("ROOM42");
        let a = ledger.add_player("A").unwrap();
        let b = ledger.add_player("B").unwrap();
        let c = ledger.add_player("C").unwrap();

        let rounds = [
            vec![(&a, 3), (&b, -2), (&c, 7)],
            vec![(&b, 4)],
            vec![],
            vec![(&a, -10), (&c, 1)],
        ];
        for round in rounds.iter() {
            ledger.record_round(&scores(round)).unwrap();
            for player in ledger.players() {
                assert_eq!(
                    player.rounds.len() as u32,
                    ledger.current_round() - 1,
                    "player {} out of step",
                    player.name
                );
            }
            assert_invariants(&ledger);
        }

        let a_after = ledger.player(&a.id).unwrap();
        assert_eq!(a_after.rounds, vec![3, 0, 0, -10]);
        assert_eq!(a_after.total_score, -7);
    }

    #[test]
    fn test_late_joiner_is_back_filled() {
        let mut ledger = ScoreLedger::new("ROOM42");
        let a = ledger.add_player("A").unwrap();
        ledger.record_round(&scores(&[(&a, 6)])).unwrap();

        let b = ledger.add_player("B").unwrap();
        assert!(ledger.player(&b.id).unwrap().rounds.is_empty());

        ledger.record_round(&HashMap::new()).unwrap();
        assert_eq!(ledger.current_round(), 3);
        for player in ledger.players() {
            assert_eq!(player.rounds.len() as u32, ledger.current_round() - 1);
        }
        assert_eq!(ledger.player(&b.id).unwrap().rounds, vec![0, 0]);

        ledger.record_round(&scores(&[(&b, 4)])).unwrap();
        let b_after = ledger.player(&b.id).unwrap();
        assert_eq!(b_after.rounds, vec![0, 0, 4]);
        assert_eq!(b_after.total_score, 4);
        assert_invariants(&ledger);
    }

    #[test]
    fn test_leaderboard_is_non_increasing() {
        let mut ledger = ScoreLedger::new("ROOM42");
        let ids: Vec<Player> = ["P1", "P2", "P3", "P4", "P5"]
            .iter()
            .map(|name| ledger.add_player(name).unwrap())
            .collect();

        let round_scores = [[4, -3, 9, 0, 9], [2, 12, -1, 5, 0], [0, 0, 0, 7, -2]];
        for row in round_scores.iter() {
            let map: HashMap<PlayerId, i64> = ids
                .iter()
                .zip(row.iter())
                .map(|(p, s)| (p.id.clone(), *s))
                .collect();
            ledger.record_round(&map).unwrap();

            let board = ledger.leaderboard();
            assert_eq!(board.len(), ids.len());
            for pair in board.windows(2) {
                assert!(pair[0].total_score >= pair[1].total_score);
            }
        }
    }
}
