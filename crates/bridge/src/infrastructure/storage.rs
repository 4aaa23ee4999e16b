//! Storage adapters backing the saved-game library
//!
//! `FileStore` keeps key-value pairs in a JSON file at:
//! - Linux: ~/.config/hearth/bridge/storage.json
//! - macOS: ~/Library/Application Support/io.hearth.bridge/storage.json
//! - Windows: C:\Users\<User>\AppData\Roaming\hearth\bridge\storage.json
//!
//! Every operation re-reads the file rather than holding a cache, so the
//! library service's read-through guarantee holds even when another process
//! writes the same file. `MemoryStore` is the in-memory substitute used by
//! tests and ephemeral runs.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use directories::ProjectDirs;

use crate::ports::outbound::{PersistenceError, StoragePort};

/// File-backed key-value store.
#[derive(Debug, Clone)]
pub struct FileStore {
    storage_path: PathBuf,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore {
    /// Create a store at the platform-specific config location.
    pub fn new() -> Self {
        let storage_path = if let Some(dirs) = ProjectDirs::from("io", "hearth", "bridge") {
            dirs.config_dir().join("storage.json")
        } else {
            // Fallback to current directory if project dirs unavailable
            PathBuf::from("hearth_storage.json")
        };

        tracing::debug!("file storage at: {:?}", storage_path);
        Self { storage_path }
    }

    /// Create a store at an explicit path.
    pub fn with_path(storage_path: PathBuf) -> Self {
        Self { storage_path }
    }

    fn read_map(&self) -> Result<HashMap<String, String>, PersistenceError> {
        if !self.storage_path.exists() {
            return Ok(HashMap::new());
        }
        let data = fs::read_to_string(&self.storage_path)
            .map_err(|e| PersistenceError::Read(e.to_string()))?;
        serde_json::from_str(&data).map_err(|e| PersistenceError::Corrupt(e.to_string()))
    }

    fn write_map(&self, map: &HashMap<String, String>) -> Result<(), PersistenceError> {
        if let Some(parent) = self.storage_path.parent() {
            fs::create_dir_all(parent).map_err(|e| PersistenceError::Write(e.to_string()))?;
        }
        let data = serde_json::to_string_pretty(map)
            .map_err(|e| PersistenceError::Write(e.to_string()))?;
        fs::write(&self.storage_path, data).map_err(|e| PersistenceError::Write(e.to_string()))
    }
}

impl StoragePort for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(PersistenceError::Corrupt(detail)) => {
                // A corrupt storage file should not make saving impossible;
                // start over and let the write repair it.
                tracing::warn!("discarding corrupt storage file: {detail}");
                HashMap::new()
            }
            Err(other) => return Err(other),
        };
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// In-memory key-value store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StoragePort for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.entries().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.entries().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_roundtrips_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::with_path(dir.path().join("storage.json"));

        assert_eq!(store.load("library"), Ok(None));
        store.save("library", "[1,2,3]").expect("save");
        assert_eq!(store.load("library"), Ok(Some("[1,2,3]".to_string())));
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");

        FileStore::with_path(path.clone())
            .save("library", "[]")
            .expect("save");

        let reopened = FileStore::with_path(path);
        assert_eq!(reopened.load("library"), Ok(Some("[]".to_string())));
    }

    #[test]
    fn file_store_remove_is_a_noop_for_absent_keys() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = FileStore::with_path(dir.path().join("storage.json"));

        assert_eq!(store.remove("missing"), Ok(()));
        store.save("library", "x").expect("save");
        store.remove("library").expect("remove");
        assert_eq!(store.load("library"), Ok(None));
    }

    #[test]
    fn file_store_save_recovers_from_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("storage.json");
        fs::write(&path, "not json at all").expect("write");

        let store = FileStore::with_path(path);
        assert!(matches!(
            store.load("library"),
            Err(PersistenceError::Corrupt(_))
        ));

        store.save("library", "[]").expect("save repairs the file");
        assert_eq!(store.load("library"), Ok(Some("[]".to_string())));
    }

    #[test]
    fn memory_store_roundtrips_values() {
        let store = MemoryStore::new();
        store.save("library", "[]").expect("save");
        assert_eq!(store.load("library"), Ok(Some("[]".to_string())));
        store.remove("library").expect("remove");
        assert_eq!(store.load("library"), Ok(None));
    }
}
