//! Persistence for ledgers, keyed by room code.
//!
//! A store only moves serialized ledgers in and out; it never merges. Saving a
//! room overwrites whatever was stored under its code before.

mod file;
mod memory;
mod remote;

use crate::ledger::{LedgerError, ScoreLedger};
use async_trait::async_trait;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use remote::RemoteStore;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur while loading or saving a ledger
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Remote store responded with status {0}")]
    Status(reqwest::StatusCode),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Stored ledger is invalid: {0}")]
    Ledger(#[from] LedgerError),
}

/// Trait that all ledger stores must implement
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Persist the ledger under the room code, replacing any previous value
    async fn save(&self, room: &str, ledger: &ScoreLedger) -> StoreResult<()>;

    /// Load the ledger stored under the room code. `Ok(None)` means not found.
    async fn load(&self, room: &str) -> StoreResult<Option<ScoreLedger>>;

    /// Get the name of this store
    fn name(&self) -> &str;
}

/// Parse a stored blob. Legacy blobs without a room code take the key's code.
fn decode(room: &str, blob: &str) -> StoreResult<ScoreLedger> {
    let mut ledger = ScoreLedger::deserialize(blob)?;
    if ledger.room_code().is_empty() {
        ledger.rebind_room(room);
    }
    Ok(ledger)
}
