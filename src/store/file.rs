use super::*;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One JSON file per room code inside a data directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, room: &str) -> PathBuf {
        self.dir.join(format!("{}.json", room))
    }
}

#[async_trait]
impl LedgerStore for FileStore {
    async fn save(&self, room: &str, ledger: &ScoreLedger) -> StoreResult<()> {
        let blob = serde_json::to_string_pretty(&ledger.export())?;

        tokio::fs::create_dir_all(&self.dir).await?;

        // Write to a sibling temp file first so a crash never leaves a truncated ledger
        let tmp = self.dir.join(format!(".{}.json.tmp", room));
        tokio::fs::write(&tmp, blob).await?;
        tokio::fs::rename(&tmp, self.path_for(room)).await?;

        tracing::debug!("Saved room {} to {}", room, self.dir.display());
        Ok(())
    }

    async fn load(&self, room: &str) -> StoreResult<Option<ScoreLedger>> {
        match tokio::fs::read_to_string(self.path_for(room)).await {
            Ok(blob) => decode(room, &blob).map(Some),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        assert!(store.load("ABC234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_dir_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested").join("rooms"));

        let mut ledger = ScoreLedger::new("ABC234");
        let alice = ledger.add_player("Alice").unwrap();
        ledger.add_player("Bob").unwrap();
        ledger
            .record_round(&[(alice.id.clone(), -2)].into_iter().collect())
            .unwrap();

        store.save("ABC234", &ledger).await.unwrap();
        assert!(store.dir().join("ABC234.json").exists());
        assert!(!store.dir().join(".ABC234.json.tmp").exists());

        let loaded = store.load("ABC234").await.unwrap().unwrap();
        assert_eq!(loaded, ledger);
    }

    #[tokio::test]
    async fn test_rooms_are_kept_apart() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let mut first = ScoreLedger::new("ROOM01");
        first.add_player("Alice").unwrap();
        let second = ScoreLedger::new("ROOM02");

        store.save("ROOM01", &first).await.unwrap();
        store.save("ROOM02", &second).await.unwrap();

        assert_eq!(store.load("ROOM01").await.unwrap().unwrap(), first);
        assert_eq!(store.load("ROOM02").await.unwrap().unwrap(), second);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        std::fs::write(dir.path().join("BROKEN.json"), "{oops").unwrap();

        let result = store.load("BROKEN").await;
        assert!(matches!(result, Err(StoreError::Ledger(_))));
    }
}
