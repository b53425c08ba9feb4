//! Frontdesk - Clinic front-desk scheduling core
//!
//! This crate provides provider time slot generation with unavailability
//! tracking, and a priority-ordered waiting room with wait time estimates,
//! persisted through a pluggable key-value store.

pub mod config;
pub mod error;
pub mod metrics;
pub mod service;
pub mod slots;
pub mod storage;
pub mod types;
pub mod utils;
pub mod waiting_room;

// Re-export commonly used types and traits
pub use error::{ClinicError, Result};
pub use types::*;

// Re-export key components
pub use service::FrontDesk;
pub use slots::{SlotConflictPolicy, SlotGenerationRequest, TimeSlot, TimeSlotResolver};
pub use storage::{InMemoryStore, JsonFileStore, KeyValueStore};
pub use waiting_room::{WaitingQueueEntry, WaitingRoomHistoryRecord, WaitingRoomScheduler};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
