use super::ScoreLedger;
use crate::types::*;

/// Display badge for a 0-based leaderboard position
pub fn rank_badge(position: usize) -> String {
    match position {
        0 => "🥇".to_string(),
        1 => "🥈".to_string(),
        2 => "🥉".to_string(),
        n => (n + 1).to_string(),
    }
}

impl ScoreLedger {
    /// Players ordered by total score descending.
    ///
    /// The sort is stable, so tied players keep the order they joined in.
    /// Returns owned copies; mutating the result never touches the ledger.
    pub fn standings(&self) -> Vec<Player> {
        let mut players = self.players.clone();
        players.sort_by(|a, b| b.total_score.cmp(&a.total_score));
        players
    }

    /// Ranked view with 1-based ranks and podium badges
    pub fn leaderboard(&self) -> Vec<LeaderboardEntry> {
        self.standings()
            .into_iter()
            .enumerate()
            .map(|(position, player)| LeaderboardEntry {
                rank: position + 1,
                badge: rank_badge(position),
                rounds_played: player.rounds.len(),
                id: player.id,
                name: player.name,
                total_score: player.total_score,
            })
            .collect()
    }
}
