//! Key-value persistence port and in-memory implementations
//!
//! Components hydrate their collections from a [`KeyValueStore`] once at
//! construction and write the full collection back after every mutation.

use crate::error::ClinicError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::RwLock;

/// Trait for key-value persistence operations
pub trait KeyValueStore: Send + Sync {
    /// Load the value stored under `key`, if any
    fn load(&self, key: &str) -> crate::error::Result<Option<Value>>;

    /// Store `value` under `key`, replacing any previous value
    fn save(&self, key: &str, value: Value) -> crate::error::Result<()>;

    /// Remove the value under `key`
    fn remove(&self, key: &str) -> crate::error::Result<bool>;

    /// List all stored keys
    fn keys(&self) -> crate::error::Result<Vec<String>>;
}

/// Load a whole collection; a missing key yields an empty collection
pub fn load_collection<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> crate::error::Result<Vec<T>> {
    match store.load(key)? {
        Some(value) => serde_json::from_value(value).map_err(|e| {
            ClinicError::Storage {
                message: format!("Failed to decode collection '{}': {}", key, e),
            }
            .into()
        }),
        None => Ok(Vec::new()),
    }
}

/// Overwrite a whole collection
pub fn save_collection<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    items: &[T],
) -> crate::error::Result<()> {
    let value = serde_json::to_value(items).map_err(|e| ClinicError::Storage {
        message: format!("Failed to encode collection '{}': {}", key, e),
    })?;
    store.save(key, value)
}

/// In-memory key-value store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn load(&self, key: &str) -> crate::error::Result<Option<Value>> {
        let values = self
            .values
            .read()
            .map_err(|_| ClinicError::InternalError {
                message: "Failed to acquire store read lock".to_string(),
            })?;

        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: Value) -> crate::error::Result<()> {
        let mut values = self
            .values
            .write()
            .map_err(|_| ClinicError::InternalError {
                message: "Failed to acquire store write lock".to_string(),
            })?;

        values.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) -> crate::error::Result<bool> {
        let mut values = self
            .values
            .write()
            .map_err(|_| ClinicError::InternalError {
                message: "Failed to acquire store write lock".to_string(),
            })?;

        Ok(values.remove(key).is_some())
    }

    fn keys(&self) -> crate::error::Result<Vec<String>> {
        let values = self
            .values
            .read()
            .map_err(|_| ClinicError::InternalError {
                message: "Failed to acquire store read lock".to_string(),
            })?;

        let mut keys: Vec<String> = values.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

/// Mock store for testing: records saves and can be told to fail them
#[derive(Debug, Default)]
pub struct MockKeyValueStore {
    inner: InMemoryStore,
    save_calls: RwLock<Vec<String>>,
    fail_saves: RwLock<bool>,
}

impl MockKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys of all save calls made, in order (for testing)
    pub fn get_save_calls(&self) -> Vec<String> {
        self.save_calls
            .read()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    /// Clear recorded save calls (for testing)
    pub fn clear_save_calls(&self) {
        if let Ok(mut calls) = self.save_calls.write() {
            calls.clear();
        }
    }

    /// Make every subsequent save fail
    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut flag) = self.fail_saves.write() {
            *flag = fail;
        }
    }

    /// Preset a value without recording a save call
    pub fn preset(&self, key: &str, value: Value) -> crate::error::Result<()> {
        self.inner.save(key, value)
    }
}

impl KeyValueStore for MockKeyValueStore {
    fn load(&self, key: &str) -> crate::error::Result<Option<Value>> {
        self.inner.load(key)
    }

    fn save(&self, key: &str, value: Value) -> crate::error::Result<()> {
        // Record the call for testing
        if let Ok(mut calls) = self.save_calls.write() {
            calls.push(key.to_string());
        }

        let failing = self.fail_saves.read().map(|flag| *flag).unwrap_or(false);
        if failing {
            return Err(ClinicError::Storage {
                message: format!("Simulated save failure for '{}'", key),
            }
            .into());
        }

        self.inner.save(key, value)
    }

    fn remove(&self, key: &str) -> crate::error::Result<bool> {
        self.inner.remove(key)
    }

    fn keys(&self) -> crate::error::Result<Vec<String>> {
        self.inner.keys()
    }
}
