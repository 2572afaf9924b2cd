use super::{LedgerError, LedgerResult, ScoreLedger, MAX_ROUNDS};
use crate::types::*;
use std::collections::HashMap;

fn overflow(player: &Player) -> LedgerError {
    LedgerError::InvalidInput(format!("Score for {} is out of range", player.name))
}

/// Parse a typed score. Blank text counts as zero.
pub fn parse_score(input: &ScoreInput) -> Option<i64> {
    match input {
        ScoreInput::Points(points) => Some(*points),
        ScoreInput::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0)
            } else {
                trimmed.parse().ok()
            }
        }
    }
}

impl ScoreLedger {
    /// Append one round for every current player and advance the round counter.
    ///
    /// Players missing from `scores` get 0 for this round. Players who joined
    /// late are back-filled with 0 for the rounds they missed, so afterwards
    /// every player holds `current_round - 1` rounds. Returns the number of the
    /// round that was recorded.
    pub fn record_round(&mut self, scores: &HashMap<PlayerId, i64>) -> LedgerResult<u32> {
        if self.players.is_empty() {
            return Err(LedgerError::EmptyRoom);
        }

        if self.current_round > MAX_ROUNDS {
            return Err(LedgerError::InvalidInput(format!(
                "Room {} already has the maximum of {} rounds",
                self.room_code, MAX_ROUNDS
            )));
        }

        if let Some(unknown) = scores
            .keys()
            .find(|id| !self.players.iter().any(|p| &p.id == *id))
        {
            return Err(LedgerError::PlayerNotFound(unknown.clone()));
        }

        // Compute everything first so an overflow leaves no half-recorded round
        let updates = self
            .players
            .iter()
            .map(|p| {
                let score = scores.get(&p.id).copied().unwrap_or(0);
                p.total_score
                    .checked_add(score)
                    .map(|total| (score, total))
                    .ok_or_else(|| overflow(p))
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        let played = (self.current_round - 1) as usize;
        for (player, (score, total)) in self.players.iter_mut().zip(updates) {
            if player.rounds.len() < played {
                player.rounds.resize(played, 0);
            }
            player.rounds.push(score);
            player.total_score = total;
        }

        let recorded = self.current_round;
        self.current_round += 1;
        tracing::info!(
            "Room {}: recorded round {} for {} players",
            self.room_code,
            recorded,
            self.players.len()
        );
        Ok(recorded)
    }

    /// Record a round from form input, where each value may be a number or text
    pub fn record_round_inputs(
        &mut self,
        inputs: &HashMap<PlayerId, ScoreInput>,
    ) -> LedgerResult<u32> {
        let mut scores = HashMap::with_capacity(inputs.len());
        for (player_id, input) in inputs {
            let score = parse_score(input).ok_or_else(|| {
                LedgerError::InvalidInput(format!(
                    "Score for player {} is not a whole number",
                    player_id
                ))
            })?;
            scores.insert(player_id.clone(), score);
        }
        self.record_round(&scores)
    }

    /// Replace one historical score. Returns the previous score.
    pub fn edit_round(
        &mut self,
        player_id: &str,
        round_index: usize,
        new_score: i64,
    ) -> LedgerResult<i64> {
        let player = self.player_mut(player_id)?;
        let old_score = *player
            .rounds
            .get(round_index)
            .ok_or_else(|| LedgerError::InvalidRoundIndex {
                player_id: player_id.to_string(),
                index: round_index,
                len: player.rounds.len(),
            })?;

        let total = player
            .total_score
            .checked_sub(old_score)
            .and_then(|t| t.checked_add(new_score))
            .ok_or_else(|| overflow(player))?;

        player.rounds[round_index] = new_score;
        player.total_score = total;
        Ok(old_score)
    }

    /// Delete one historical score; later rounds of that player shift down by one.
    /// Returns the removed score.
    pub fn delete_round(&mut self, player_id: &str, round_index: usize) -> LedgerResult<i64> {
        let player = self.player_mut(player_id)?;
        let removed = *player
            .rounds
            .get(round_index)
            .ok_or_else(|| LedgerError::InvalidRoundIndex {
                player_id: player_id.to_string(),
                index: round_index,
                len: player.rounds.len(),
            })?;

        let total = player
            .total_score
            .checked_sub(removed)
            .ok_or_else(|| overflow(player))?;

        player.rounds.remove(round_index);
        player.total_score = total;
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_with_rounds() -> (ScoreLedger, Player, Player) {
        let mut ledger = ScoreLedger::new("ROOM42");
        let alice = ledger.add_player("Alice").unwrap();
        let bob = ledger.add_player("Bob").unwrap();
        for (a, b) in [(5, 3), (1, 10), (7, -2)] {
            let round: HashMap<PlayerId, i64> =
                [(alice.id.clone(), a), (bob.id.clone(), b)].into_iter().collect();
            ledger.record_round(&round).unwrap();
        }
        (ledger, alice, bob)
    }

    #[test]
    fn test_record_round_defaults_missing_to_zero() {
        let mut ledger = ScoreLedger::new("ROOM42");
        let alice = ledger.add_player("Alice").unwrap();
        let bob = ledger.add_player("Bob").unwrap();

        let round: HashMap<PlayerId, i64> = [(alice.id.clone(), 6)].into_iter().collect();
        assert_eq!(ledger.record_round(&round).unwrap(), 1);

        assert_eq!(ledger.player(&bob.id).unwrap().rounds, vec![0]);
        assert_eq!(ledger.player(&alice.id).unwrap().total_score, 6);
        assert_eq!(ledger.current_round(), 2);
    }

    #[test]
    fn test_record_round_rejects_empty_room() {
        let mut ledger = ScoreLedger::new("ROOM42");

        let result = ledger.record_round(&HashMap::new());
        assert_eq!(result, Err(LedgerError::EmptyRoom));
        assert_eq!(ledger.current_round(), 1);
    }

    #[test]
    fn test_record_round_rejects_unknown_player() {
        let (mut ledger, alice, _) = ledger_with_rounds();
        let before = ledger.clone();

        let round: HashMap<PlayerId, i64> =
            [(alice.id.clone(), 1), ("ghost".to_string(), 2)].into_iter().collect();
        let result = ledger.record_round(&round);
        assert_eq!(result, Err(LedgerError::PlayerNotFound("ghost".to_string())));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_record_round_overflow_records_nothing() {
        let (mut ledger, alice, bob) = ledger_with_rounds();
        let before = ledger.clone();

        let round: HashMap<PlayerId, i64> =
            [(alice.id.clone(), 1), (bob.id.clone(), i64::MAX)].into_iter().collect();
        let result = ledger.record_round(&round);
        assert!(matches!(result, Err(LedgerError::InvalidInput(_))));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_record_round_stops_at_round_limit() {
        let mut ledger = ScoreLedger::new("ROOM42");
        let alice = ledger.add_player("Alice").unwrap();
        ledger.current_round = MAX_ROUNDS + 1;
        let before = ledger.clone();

        let round: HashMap<PlayerId, i64> = [(alice.id.clone(), 3)].into_iter().collect();
        let result = ledger.record_round(&round);
        assert!(matches!(result, Err(LedgerError::InvalidInput(_))));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_record_round_inputs_parses_text() {
        let mut ledger = ScoreLedger::new("ROOM42");
        let alice = ledger.add_player("Alice").unwrap();
        let bob = ledger.add_player("Bob").unwrap();
        let carol = ledger.add_player("Carol").unwrap();

        let inputs: HashMap<PlayerId, ScoreInput> = [
            (alice.id.clone(), ScoreInput::from(" 12 ")),
            (bob.id.clone(), ScoreInput::from("")),
            (carol.id.clone(), ScoreInput::from(-4)),
        ]
        .into_iter()
        .collect();
        ledger.record_round_inputs(&inputs).unwrap();

        assert_eq!(ledger.player(&alice.id).unwrap().rounds, vec![12]);
        assert_eq!(ledger.player(&bob.id).unwrap().rounds, vec![0]);
        assert_eq!(ledger.player(&carol.id).unwrap().rounds, vec![-4]);
    }

    #[test]
    fn test_record_round_inputs_rejects_malformed_score() {
        let mut ledger = ScoreLedger::new("ROOM42");
        let alice = ledger.add_player("Alice").unwrap();
        let bob = ledger.add_player("Bob").unwrap();

        let inputs: HashMap<PlayerId, ScoreInput> = [
            (alice.id.clone(), ScoreInput::from("3")),
            (bob.id.clone(), ScoreInput::from("three")),
        ]
        .into_iter()
        .collect();
        let result = ledger.record_round_inputs(&inputs);

        assert!(matches!(result, Err(LedgerError::InvalidInput(_))));
        assert_eq!(ledger.current_round(), 1);
        assert!(ledger.players().iter().all(|p| p.rounds.is_empty()));
    }

    #[test]
    fn test_edit_round_adjusts_total() {
        let (mut ledger, alice, _) = ledger_with_rounds();
        let total_before = ledger.player(&alice.id).unwrap().total_score;

        let old = ledger.edit_round(&alice.id, 1, 20).unwrap();
        assert_eq!(old, 1);

        let alice_after = ledger.player(&alice.id).unwrap();
        assert_eq!(alice_after.rounds[1], 20);
        assert_eq!(alice_after.total_score, total_before + 20 - old);
        assert_eq!(alice_after.total_score, alice_after.rounds.iter().sum::<i64>());
    }

    #[test]
    fn test_edit_round_rejects_bad_index() {
        let (mut ledger, alice, _) = ledger_with_rounds();
        let before = ledger.clone();

        let result = ledger.edit_round(&alice.id, 3, 1);
        assert_eq!(
            result,
            Err(LedgerError::InvalidRoundIndex {
                player_id: alice.id.clone(),
                index: 3,
                len: 3,
            })
        );
        assert_eq!(ledger, before);

        let result = ledger.edit_round("ghost", 0, 1);
        assert!(matches!(result, Err(LedgerError::PlayerNotFound(_))));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_delete_round_shifts_later_rounds() {
        let (mut ledger, alice, bob) = ledger_with_rounds();

        let removed = ledger.delete_round(&alice.id, 0).unwrap();
        assert_eq!(removed, 5);

        let alice_after = ledger.player(&alice.id).unwrap();
        assert_eq!(alice_after.rounds, vec![1, 7]);
        assert_eq!(alice_after.total_score, 8);

        // Only the targeted player is affected
        let bob_after = ledger.player(&bob.id).unwrap();
        assert_eq!(bob_after.rounds, vec![3, 10, -2]);
        assert_eq!(bob_after.total_score, 11);
        assert_eq!(ledger.current_round(), 4);
    }

    #[test]
    fn test_delete_round_rejects_bad_index() {
        let (mut ledger, _, bob) = ledger_with_rounds();
        let before = ledger.clone();

        let result = ledger.delete_round(&bob.id, 10);
        assert!(matches!(
            result,
            Err(LedgerError::InvalidRoundIndex { index: 10, .. })
        ));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_parse_score() {
        assert_eq!(parse_score(&ScoreInput::from("  ")), Some(0));
        assert_eq!(parse_score(&ScoreInput::from("-7")), Some(-7));
        assert_eq!(parse_score(&ScoreInput::from("4.5")), None);
        assert_eq!(parse_score(&ScoreInput::from(9)), Some(9));
    }
}
