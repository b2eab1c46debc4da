//! Session persistence
//!
//! Successful build invocations are kept in a JSON map keyed by session
//! key. The file survives process restarts and backs the replay menu.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use rnsim_core::prelude::*;
use rnsim_core::SessionRecord;

/// Persistence interface consumed by the orchestration layer.
///
/// `load` returns records ordered by descending timestamp (most recent
/// first). Saving an existing key overwrites the previous record.
pub trait SessionStore {
    fn load(&self) -> Result<Vec<SessionRecord>>;
    fn save(&self, record: &SessionRecord) -> Result<()>;
    fn clear_all(&self) -> Result<()>;
}

/// File-backed session store.
///
/// Read-modify-write cycles serialize on an exclusive file lock, and new
/// content lands via a temp-file rename so a concurrent reader never
/// observes a partially written file.
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Default location: `~/.local/share/rnsim/sessions.json`
    pub fn default_path() -> PathBuf {
        let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("rnsim").join("sessions.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, SessionRecord>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| Error::store(format!("corrupt session file: {}", e))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, records: &BTreeMap<String, SessionRecord>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Writers serialize on the live file's lock; content lands via
        // rename so readers never see a partial write.
        let lock = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .open(&self.path)
            .map_err(|e| Error::store(format!("failed to open session file: {}", e)))?;
        lock.lock_exclusive()
            .map_err(|e| Error::store(format!("failed to lock session file: {}", e)))?;

        let tmp_path = self.path.with_extension("json.tmp");
        let mut tmp = std::fs::File::create(&tmp_path)
            .map_err(|e| Error::store(format!("failed to create temp session file: {}", e)))?;
        let content = serde_json::to_string_pretty(records)?;
        tmp.write_all(content.as_bytes())
            .map_err(|e| Error::store(format!("failed to write session file: {}", e)))?;
        tmp.flush()
            .map_err(|e| Error::store(format!("failed to flush session file: {}", e)))?;

        std::fs::rename(&tmp_path, &self.path)
            .map_err(|e| Error::store(format!("failed to replace session file: {}", e)))?;

        // Lock released when `lock` is dropped
        Ok(())
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Vec<SessionRecord>> {
        let mut records: Vec<SessionRecord> = self.read_all()?.into_values().collect();
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    fn save(&self, record: &SessionRecord) -> Result<()> {
        let mut records = self.read_all()?;
        records.insert(record.key.clone(), record.clone());
        self.write_all(&records)?;

        info!("saved session '{}'", record.key);
        Ok(())
    }

    fn clear_all(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!("cleared all sessions");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rnsim_core::Platform;
    use tempfile::TempDir;

    fn record(key: &str, ts_secs: i64) -> SessionRecord {
        SessionRecord {
            key: key.to_string(),
            command: format!("ENVFILE=.env.dev react-native run-android --variant=devDebug # {}", key),
            platform: Platform::Android,
            device: "Pixel_4".to_string(),
            timestamp: Utc.timestamp_opt(ts_secs, 0).unwrap(),
        }
    }

    fn store(temp: &TempDir) -> FileSessionStore {
        FileSessionStore::new(temp.path().join("sessions.json"))
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        assert!(store(&temp).load().unwrap().is_empty());
    }

    #[test]
    fn test_save_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        let original = record("Pixel 4-dev-debug", 1000);
        store.save(&original).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], original);
    }

    #[test]
    fn test_save_same_key_overwrites() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.save(&record("Pixel 4-dev-debug", 1000)).unwrap();
        let mut updated = record("Pixel 4-dev-debug", 2000);
        updated.command = "ENVFILE=.env.dev react-native run-android --variant=devRelease".into();
        store.save(&updated).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].command, updated.command);
        assert_eq!(loaded[0].timestamp, updated.timestamp);
    }

    #[test]
    fn test_load_orders_most_recent_first() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.save(&record("older", 1000)).unwrap();
        store.save(&record("newest", 3000)).unwrap();
        store.save(&record("middle", 2000)).unwrap();

        let keys: Vec<String> = store.load().unwrap().into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["newest", "middle", "older"]);
    }

    #[test]
    fn test_clear_all() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);

        store.save(&record("a", 1)).unwrap();
        store.clear_all().unwrap();

        assert!(store.load().unwrap().is_empty());
        // Clearing an already-empty store is fine
        store.clear_all().unwrap();
    }

    #[test]
    fn test_corrupt_file_is_reported_not_swallowed() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("sessions.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = FileSessionStore::new(&path).load().unwrap_err();
        assert!(matches!(err, Error::Store { .. }));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp = TempDir::new().unwrap();
        let store = store(&temp);
        store.save(&record("a", 1)).unwrap();

        assert!(!temp.path().join("sessions.json.tmp").exists());
    }
}
