use super::{LedgerError, LedgerResult, ScoreLedger};
use crate::types::*;

impl ScoreLedger {
    /// Add a player with a trimmed, non-blank display name
    pub fn add_player(&mut self, name: &str) -> LedgerResult<Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidInput(
                "Player name cannot be blank".to_string(),
            ));
        }

        // ULIDs don't collide in practice, but the room must never hold two equal ids
        let mut player = Player::new(name.to_string());
        while self.players.iter().any(|p| p.id == player.id) {
            player.id = ulid::Ulid::new().to_string();
        }

        tracing::info!(
            "Room {}: added player {} ({})",
            self.room_code,
            player.name,
            player.id
        );
        self.players.push(player.clone());
        Ok(player)
    }

    /// Remove a player. Unknown ids are a no-op.
    pub fn remove_player(&mut self, player_id: &str) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == player_id)?;
        let player = self.players.remove(index);
        tracing::info!(
            "Room {}: removed player {} ({})",
            self.room_code,
            player.name,
            player.id
        );
        Some(player)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// Round history of one player with 1-based round numbers
    pub fn player_detail(&self, player_id: &str) -> Option<PlayerDetail> {
        let player = self.player(player_id)?;
        Some(PlayerDetail {
            id: player.id.clone(),
            name: player.name.clone(),
            total_score: player.total_score,
            rounds: player
                .rounds
                .iter()
                .enumerate()
                .map(|(i, score)| RoundEntry {
                    round: i + 1,
                    score: *score,
                })
                .collect(),
        })
    }
}
