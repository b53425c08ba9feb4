//! Persistence port for the front desk core
//!
//! This module defines the key-value store interface the components persist
//! through, along with in-memory, mock and JSON file implementations.

pub mod file;
pub mod store;

// Re-export commonly used types
pub use file::{is_valid_key, JsonFileStore};
pub use store::{
    load_collection, save_collection, InMemoryStore, KeyValueStore, MockKeyValueStore,
};
