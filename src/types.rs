use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type PlayerId = String;
pub type RoomCode = String;

/// A participant in one room. `total_score` always equals the sum of `rounds`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    /// One entry per recorded round, index = round number - 1
    #[serde(default)]
    pub rounds: Vec<i64>,
    #[serde(default)]
    pub total_score: i64,
}

impl Player {
    pub fn new(name: String) -> Self {
        Self {
            id: ulid::Ulid::new().to_string(),
            name,
            rounds: Vec::new(),
            total_score: 0,
        }
    }
}

/// One row of the ranked view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    /// 1-based position in the leaderboard
    pub rank: usize,
    /// Medal for the podium, position number otherwise
    pub badge: String,
    pub id: PlayerId,
    pub name: String,
    pub total_score: i64,
    pub rounds_played: usize,
}

/// A single historical entry of a player, numbered for display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoundEntry {
    /// 1-based round number
    pub round: usize,
    pub score: i64,
}

/// Per-player history view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDetail {
    pub id: PlayerId,
    pub name: String,
    pub total_score: i64,
    pub rounds: Vec<RoundEntry>,
}

/// Score as typed into a round form: a number, or free text where blank means zero
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ScoreInput {
    Points(i64),
    Text(String),
}

impl From<i64> for ScoreInput {
    fn from(points: i64) -> Self {
        ScoreInput::Points(points)
    }
}

impl From<&str> for ScoreInput {
    fn from(text: &str) -> Self {
        ScoreInput::Text(text.to_string())
    }
}
