//! Configuration management for the front desk core
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values.

pub mod app;
pub mod scheduling;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings, StorageKeys, StorageSettings};
pub use scheduling::SchedulingSettings;
