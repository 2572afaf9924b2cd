use super::*;
use crate::types::RoomCode;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process store; contents are lost when the process exits
#[derive(Default)]
pub struct MemoryStore {
    blobs: RwLock<HashMap<RoomCode, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rooms stored
    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn save(&self, room: &str, ledger: &ScoreLedger) -> StoreResult<()> {
        let blob = ledger.serialize()?;
        self.blobs.write().await.insert(room.to_string(), blob);
        Ok(())
    }

    async fn load(&self, room: &str) -> StoreResult<Option<ScoreLedger>> {
        match self.blobs.read().await.get(room) {
            Some(blob) => decode(room, blob).map(Some),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        "memory"
    }
}
