//! Serialized form of a ledger.
//!
//! The JSON layout uses camelCase keys so that blobs saved by the browser
//! version of the score sheet (`players`, `currentRound`, `roomCode`) load
//! without conversion.

use super::{LedgerError, LedgerResult, ScoreLedger, MAX_ROUNDS};
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Schema version for export format compatibility
/// Version 1: roomCode, currentRound, players with rounds and totalScore
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    1
}

fn default_current_round() -> u32 {
    1
}

/// A serializable snapshot of one room's ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LedgerExport {
    /// Schema version for forward compatibility
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// Export timestamp (ISO8601), informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    #[serde(default)]
    pub room_code: RoomCode,
    #[serde(default = "default_current_round")]
    pub current_round: u32,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl LedgerExport {
    /// Snapshot a ledger with the current timestamp
    pub fn new(ledger: &ScoreLedger) -> Self {
        Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: Some(chrono::Utc::now().to_rfc3339()),
            room_code: ledger.room_code.clone(),
            current_round: ledger.current_round,
            players: ledger.players.clone(),
        }
    }

    /// Validate the export before import
    pub fn validate(&self) -> LedgerResult<()> {
        if self.schema_version > EXPORT_SCHEMA_VERSION {
            return Err(LedgerError::InvalidInput(format!(
                "Export schema version {} is newer than supported version {}",
                self.schema_version, EXPORT_SCHEMA_VERSION
            )));
        }

        if self.current_round == 0 {
            return Err(LedgerError::InvalidInput(
                "currentRound must be at least 1".to_string(),
            ));
        }

        if self.current_round > MAX_ROUNDS + 1 {
            return Err(LedgerError::InvalidInput(format!(
                "currentRound {} exceeds the limit of {} rounds",
                self.current_round, MAX_ROUNDS
            )));
        }

        let mut seen = HashSet::new();
        for player in &self.players {
            if player.rounds.len() > MAX_ROUNDS as usize {
                return Err(LedgerError::InvalidInput(format!(
                    "Player '{}' has more than {} rounds",
                    player.id, MAX_ROUNDS
                )));
            }
            if player.name.trim().is_empty() {
                return Err(LedgerError::InvalidInput(format!(
                    "Player '{}' has a blank name",
                    player.id
                )));
            }
            if !seen.insert(player.id.as_str()) {
                return Err(LedgerError::InvalidInput(format!(
                    "Duplicate player id '{}'",
                    player.id
                )));
            }
        }

        Ok(())
    }

    /// Validate and convert into a ledger.
    ///
    /// Stored totals are ignored and recomputed from the rounds, and the round
    /// counter is raised if it lags behind the longest round history.
    pub fn into_ledger(self) -> LedgerResult<ScoreLedger> {
        self.validate()?;

        let mut players = self.players;
        for player in players.iter_mut() {
            let total = player
                .rounds
                .iter()
                .try_fold(0i64, |acc, score| acc.checked_add(*score))
                .ok_or_else(|| {
                    LedgerError::InvalidInput(format!(
                        "Rounds of player '{}' sum out of range",
                        player.id
                    ))
                })?;
            if total != player.total_score {
                tracing::warn!(
                    "Room {}: stored total {} for player {} disagrees with rounds, using {}",
                    self.room_code,
                    player.total_score,
                    player.id,
                    total
                );
                player.total_score = total;
            }
        }

        // validate() bounds every history by MAX_ROUNDS
        let longest = players.iter().map(|p| p.rounds.len()).max().unwrap_or(0);
        let min_round = longest as u32 + 1;
        let mut current_round = self.current_round;
        if current_round < min_round {
            tracing::warn!(
                "Room {}: currentRound {} behind recorded rounds, raising to {}",
                self.room_code,
                current_round,
                min_round
            );
            current_round = min_round;
        }

        Ok(ScoreLedger {
            room_code: self.room_code,
            current_round,
            players,
        })
    }
}

impl ScoreLedger {
    pub fn export(&self) -> LedgerExport {
        LedgerExport::new(self)
    }

    /// Serialize to the JSON blob handed to persistence stores
    pub fn serialize(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.export())
    }

    /// Parse and validate a JSON blob produced by `serialize` (or the legacy format)
    pub fn deserialize(blob: &str) -> LedgerResult<ScoreLedger> {
        let export: LedgerExport = serde_json::from_str(blob)
            .map_err(|e| LedgerError::InvalidInput(format!("Malformed ledger blob: {}", e)))?;
        export.into_ledger()
    }
}
