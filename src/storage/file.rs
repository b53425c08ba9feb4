//! JSON file-backed key-value store
//!
//! Each key maps to `<data_dir>/<key>.json`. Writes go to a sibling
//! `<key>.json.tmp` that is renamed over the document, so a reader sees
//! either the previous or the new contents.

use crate::error::ClinicError;
use crate::storage::store::KeyValueStore;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// Key-value store persisting each key as a JSON document on disk
#[derive(Debug)]
pub struct JsonFileStore {
    data_dir: PathBuf,
    // Serializes file access within the process
    guard: RwLock<()>,
}

impl JsonFileStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed
    pub fn open(data_dir: impl AsRef<Path>) -> crate::error::Result<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir).map_err(|e| ClinicError::Storage {
            message: format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ),
        })?;

        Ok(Self {
            data_dir,
            guard: RwLock::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path_for(&self, key: &str) -> crate::error::Result<PathBuf> {
        if !is_valid_key(key) {
            return Err(ClinicError::validation(
                "key",
                format!("'{}' must be non-empty and contain only [A-Za-z0-9_-]", key),
            )
            .into());
        }

        Ok(self.data_dir.join(format!("{}.json", key)))
    }

    fn temp_path_for(path: &Path) -> PathBuf {
        let mut temp = path.as_os_str().to_owned();
        temp.push(".tmp");
        PathBuf::from(temp)
    }

    fn lock_error() -> ClinicError {
        ClinicError::InternalError {
            message: "Failed to acquire file store lock".to_string(),
        }
    }
}

/// Whether `key` can name a document: non-empty, only `[A-Za-z0-9_-]`
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl KeyValueStore for JsonFileStore {
    fn load(&self, key: &str) -> crate::error::Result<Option<Value>> {
        let path = self.path_for(key)?;
        let _guard = self.guard.read().map_err(|_| Self::lock_error())?;

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(|e| ClinicError::Storage {
            message: format!("Failed to read {}: {}", path.display(), e),
        })?;
        let value = serde_json::from_str(&contents).map_err(|e| ClinicError::Storage {
            message: format!("Failed to parse {}: {}", path.display(), e),
        })?;

        Ok(Some(value))
    }

    fn save(&self, key: &str, value: Value) -> crate::error::Result<()> {
        let path = self.path_for(key)?;
        let _guard = self.guard.write().map_err(|_| Self::lock_error())?;

        let contents = serde_json::to_string_pretty(&value).map_err(|e| ClinicError::Storage {
            message: format!("Failed to encode '{}': {}", key, e),
        })?;

        let temp = Self::temp_path_for(&path);
        fs::write(&temp, contents).map_err(|e| ClinicError::Storage {
            message: format!("Failed to write {}: {}", temp.display(), e),
        })?;
        fs::rename(&temp, &path).map_err(|e| ClinicError::Storage {
            message: format!(
                "Failed to replace {} with {}: {}",
                path.display(),
                temp.display(),
                e
            ),
        })?;

        debug!("Saved '{}' to {}", key, path.display());
        Ok(())
    }

    fn remove(&self, key: &str) -> crate::error::Result<bool> {
        let path = self.path_for(key)?;
        let _guard = self.guard.write().map_err(|_| Self::lock_error())?;

        if !path.exists() {
            return Ok(false);
        }

        fs::remove_file(&path).map_err(|e| ClinicError::Storage {
            message: format!("Failed to remove {}: {}", path.display(), e),
        })?;
        Ok(true)
    }

    fn keys(&self) -> crate::error::Result<Vec<String>> {
        let _guard = self.guard.read().map_err(|_| Self::lock_error())?;

        let entries = fs::read_dir(&self.data_dir).map_err(|e| ClinicError::Storage {
            message: format!("Failed to list {}: {}", self.data_dir.display(), e),
        })?;

        let mut keys = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                    keys.push(stem.to_string());
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_file_store_round_trip_and_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("data")).unwrap();

        assert!(store.load("time_slots").unwrap().is_none());

        store.save("time_slots", json!([{"id": "a"}])).unwrap();
        store.save("waiting_queue", json!([])).unwrap();

        assert_eq!(
            store.load("time_slots").unwrap(),
            Some(json!([{"id": "a"}]))
        );
        assert_eq!(
            store.keys().unwrap(),
            vec!["time_slots".to_string(), "waiting_queue".to_string()]
        );

        assert!(store.remove("time_slots").unwrap());
        assert!(!store.remove("time_slots").unwrap());
    }

    #[test]
    fn test_file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = JsonFileStore::open(dir.path()).unwrap();
            store.save("history", json!([1, 2])).unwrap();
        }

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(reopened.data_dir(), dir.path());
        assert_eq!(reopened.load("history").unwrap(), Some(json!([1, 2])));
    }

    #[test]
    fn test_interrupted_write_keeps_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        store
            .save("time_slots", json!([{"id": "a"}, {"id": "b"}]))
            .unwrap();
        assert!(!dir.path().join("time_slots.json.tmp").exists());

        // A write cut off before the rename leaves only a partial temp file
        fs::write(dir.path().join("time_slots.json.tmp"), "[{\"id\": \"a\"}, {\"i").unwrap();

        let reopened = JsonFileStore::open(dir.path()).unwrap();
        assert_eq!(
            reopened.load("time_slots").unwrap(),
            Some(json!([{"id": "a"}, {"id": "b"}]))
        );
        assert_eq!(reopened.keys().unwrap(), vec!["time_slots".to_string()]);

        // The next save replaces the stale temp file
        reopened.save("time_slots", json!([{"id": "c"}])).unwrap();
        assert_eq!(
            reopened.load("time_slots").unwrap(),
            Some(json!([{"id": "c"}]))
        );
        assert!(!dir.path().join("time_slots.json.tmp").exists());
    }

    #[test]
    fn test_file_store_rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();

        assert!(store.save("../escape", json!(1)).is_err());
        assert!(store.load("").is_err());
        assert!(store.load("a/b").is_err());
        assert!(store.load("time.slots").is_err());

        assert!(is_valid_key("waiting_room-history2"));
        assert!(!is_valid_key("time.slots"));
    }

    #[test]
    fn test_file_store_reports_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        fs::write(dir.path().join("broken.json"), "{not json").unwrap();

        let err = store.load("broken").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ClinicError>(),
            Some(ClinicError::Storage { .. })
        ));
    }
}
