use crate::ledger::{LedgerError, LedgerExport, LedgerResult, ScoreLedger};
use crate::room_code;
use crate::store::{LedgerStore, MemoryStore, StoreError};
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Result type for room operations
pub type RoomResult<T> = Result<T, RoomError>;

/// Errors from room operations: either the ledger refused or the store failed
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Lock for one room. Holds `None` until the room was loaded or first saved.
pub type RoomSlot = Arc<Mutex<Option<ScoreLedger>>>;

/// Shared application state: open ledgers plus the store they persist to.
///
/// Each room is assumed to have a single editor. Saves overwrite the stored
/// ledger, so two processes editing one room end up last-writer-wins.
#[derive(Clone)]
pub struct AppState {
    /// Rooms known to exist. The map lock only covers slot lookup and insert;
    /// store I/O runs under the room's own lock.
    pub rooms: Arc<RwLock<HashMap<RoomCode, RoomSlot>>>,
    pub store: Arc<dyn LedgerStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn LedgerStore>) -> Self {
        Self {
            rooms: Arc::new(RwLock::new(HashMap::new())),
            store,
        }
    }

    async fn slot(&self, code: &RoomCode) -> RoomSlot {
        if let Some(slot) = self.rooms.read().await.get(code) {
            return slot.clone();
        }
        self.rooms
            .write()
            .await
            .entry(code.clone())
            .or_default()
            .clone()
    }

    /// Release a room lock. A slot that still holds no ledger is dropped from
    /// the map unless another request is using it.
    async fn unlock(
        &self,
        code: &RoomCode,
        slot: &RoomSlot,
        guard: MutexGuard<'_, Option<ScoreLedger>>,
    ) {
        let vacant = guard.is_none();
        drop(guard);
        if !vacant {
            return;
        }

        let mut rooms = self.rooms.write().await;
        let unused = rooms.get(code).is_some_and(|s| Arc::ptr_eq(s, slot))
            && slot.try_lock().is_ok_and(|ledger| ledger.is_none());
        if unused {
            rooms.remove(code);
        }
    }

    /// The ledger behind a locked slot, loaded from the store on first use.
    /// Rooms missing from the store get a new empty ledger; the slot stays empty.
    async fn current(
        &self,
        code: &RoomCode,
        slot: &mut Option<ScoreLedger>,
    ) -> RoomResult<ScoreLedger> {
        if let Some(ledger) = slot.as_ref() {
            return Ok(ledger.clone());
        }

        match self.store.load(code).await? {
            Some(ledger) => {
                tracing::info!("Loaded room {} from {} store", code, self.store.name());
                *slot = Some(ledger.clone());
                Ok(ledger)
            }
            None => {
                tracing::debug!("Room {} not found, starting empty ledger", code);
                Ok(ScoreLedger::new(code.clone()))
            }
        }
    }

    /// Save a whole ledger under `code`, replacing whatever the room held
    async fn put_room(&self, code: RoomCode, ledger: ScoreLedger) -> RoomResult<ScoreLedger> {
        let slot = self.slot(&code).await;
        let mut guard = slot.lock().await;

        let saved = self.store.save(&code, &ledger).await;
        if saved.is_ok() {
            *guard = Some(ledger.clone());
        }
        self.unlock(&code, &slot, guard).await;

        saved?;
        Ok(ledger)
    }

    /// Create a room under a freshly generated code and persist it
    pub async fn create_room(&self) -> RoomResult<ScoreLedger> {
        let code = room_code::generate();
        let ledger = self
            .put_room(code.clone(), ScoreLedger::new(code.clone()))
            .await?;

        tracing::info!("Created room {} ({} store)", code, self.store.name());
        Ok(ledger)
    }

    /// Open a room: cached ledger, else the stored one, else a new empty ledger.
    ///
    /// Opening a room that was never saved does not keep it in memory.
    pub async fn open_room(&self, code: &str) -> RoomResult<ScoreLedger> {
        let code = room_code::normalize(code)?;
        let slot = self.slot(&code).await;
        let mut guard = slot.lock().await;

        let ledger = self.current(&code, &mut guard).await;
        self.unlock(&code, &slot, guard).await;
        ledger
    }

    /// Apply a mutation to a room and persist the result.
    ///
    /// The mutation runs on a copy; the cached ledger only changes once the
    /// store accepted the new state. Returns the mutation's value and the
    /// updated ledger.
    pub async fn update_room<T, F>(&self, code: &str, mutate: F) -> RoomResult<(T, ScoreLedger)>
    where
        F: FnOnce(&mut ScoreLedger) -> LedgerResult<T>,
    {
        let code = room_code::normalize(code)?;
        let slot = self.slot(&code).await;
        let mut guard = slot.lock().await;

        let outcome = self.apply(&code, &mut guard, mutate).await;
        self.unlock(&code, &slot, guard).await;
        outcome
    }

    async fn apply<T, F>(
        &self,
        code: &RoomCode,
        slot: &mut Option<ScoreLedger>,
        mutate: F,
    ) -> RoomResult<(T, ScoreLedger)>
    where
        F: FnOnce(&mut ScoreLedger) -> LedgerResult<T>,
    {
        let mut ledger = self.current(code, slot).await?;
        let value = mutate(&mut ledger)?;

        if let Err(e) = self.store.save(code, &ledger).await {
            tracing::error!("Failed to save room {}: {}", code, e);
            return Err(e.into());
        }

        *slot = Some(ledger.clone());
        Ok((value, ledger))
    }

    /// Replace a room's state with an imported snapshot
    pub async fn import_room(&self, code: &str, export: LedgerExport) -> RoomResult<ScoreLedger> {
        let code = room_code::normalize(code)?;
        let mut ledger = export.into_ledger()?;
        if ledger.room_code() != code {
            tracing::info!(
                "Importing snapshot of room '{}' into room {}",
                ledger.room_code(),
                code
            );
            ledger.rebind_room(code.clone());
        }

        self.put_room(code, ledger).await
    }

    pub async fn add_player(&self, code: &str, name: &str) -> RoomResult<Player> {
        let (player, _) = self.update_room(code, |l| l.add_player(name)).await?;
        Ok(player)
    }

    pub async fn remove_player(&self, code: &str, player_id: &str) -> RoomResult<Option<Player>> {
        let (removed, _) = self
            .update_room(code, |l| Ok(l.remove_player(player_id)))
            .await?;
        Ok(removed)
    }

    /// Record a round; returns the recorded round number and the updated room
    pub async fn record_round(
        &self,
        code: &str,
        inputs: &HashMap<PlayerId, ScoreInput>,
    ) -> RoomResult<(u32, ScoreLedger)> {
        self.update_room(code, |l| l.record_round_inputs(inputs)).await
    }

    /// Replace one historical score; returns the previous score and the updated room
    pub async fn edit_round(
        &self,
        code: &str,
        player_id: &str,
        round_index: usize,
        new_score: i64,
    ) -> RoomResult<(i64, ScoreLedger)> {
        self.update_room(code, |l| l.edit_round(player_id, round_index, new_score))
            .await
    }

    /// Delete one historical score; returns the removed score and the updated room
    pub async fn delete_round(
        &self,
        code: &str,
        player_id: &str,
        round_index: usize,
    ) -> RoomResult<(i64, ScoreLedger)> {
        self.update_room(code, |l| l.delete_round(player_id, round_index)).await
    }

    pub async fn leaderboard(&self, code: &str) -> RoomResult<Vec<LeaderboardEntry>> {
        Ok(self.open_room(code).await?.leaderboard())
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }
}
