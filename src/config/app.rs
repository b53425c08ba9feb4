//! Main application configuration
//!
//! This module defines the primary configuration structures for the front desk
//! core, including TOML file loading, environment variable overrides and
//! validation.

use crate::config::scheduling::SchedulingSettings;
use crate::storage::is_valid_key;
use crate::waiting_room::WaitTimeConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub storage: StorageSettings,
    pub scheduling: SchedulingSettings,
    pub waiting_room: WaitTimeConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

/// Persistence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding one JSON document per collection
    pub data_dir: PathBuf,
    /// Collection key names
    pub keys: StorageKeys,
}

/// Keys under which each collection is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub slots: String,
    pub unavailability: String,
    pub queue: String,
    pub history: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "frontdesk".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./frontdesk-data"),
            keys: StorageKeys::default(),
        }
    }
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            slots: "time_slots".to_string(),
            unavailability: "unavailability_periods".to_string(),
            queue: "waiting_queue".to_string(),
            history: "waiting_room_history".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env_overrides()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_env_overrides()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse a TOML file over the defaults, without environment overrides or
    /// validation
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Apply `FRONTDESK_*` environment variables on top of the current values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        // Service settings
        if let Ok(name) = env::var("FRONTDESK_SERVICE_NAME") {
            self.service.name = name;
        }
        if let Ok(log_level) = env::var("FRONTDESK_LOG_LEVEL") {
            self.service.log_level = log_level;
        }

        // Storage settings
        if let Ok(data_dir) = env::var("FRONTDESK_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(data_dir);
        }

        // Scheduling settings
        if let Ok(minutes) = env::var("FRONTDESK_SLOT_MINUTES") {
            self.scheduling.default_slot_minutes = minutes
                .parse()
                .map_err(|_| anyhow!("Invalid FRONTDESK_SLOT_MINUTES value: {}", minutes))?;
        }
        if let Ok(start) = env::var("FRONTDESK_DAY_START") {
            self.scheduling.day_start = crate::utils::parse_time_of_day("day_start", &start)?;
        }
        if let Ok(end) = env::var("FRONTDESK_DAY_END") {
            self.scheduling.day_end = crate::utils::parse_time_of_day("day_end", &end)?;
        }
        if let Ok(weekends) = env::var("FRONTDESK_INCLUDE_WEEKENDS") {
            self.scheduling.include_weekends = weekends
                .parse()
                .map_err(|_| anyhow!("Invalid FRONTDESK_INCLUDE_WEEKENDS value: {}", weekends))?;
        }
        if let Ok(policy) = env::var("FRONTDESK_CONFLICT_POLICY") {
            self.scheduling.conflict_policy = policy.parse()?;
        }

        // Waiting room settings
        if let Ok(minutes) = env::var("FRONTDESK_MINUTES_PER_WAITING") {
            self.waiting_room.minutes_per_waiting = minutes
                .parse()
                .map_err(|_| anyhow!("Invalid FRONTDESK_MINUTES_PER_WAITING value: {}", minutes))?;
        }
        if let Ok(minutes) = env::var("FRONTDESK_MINUTES_PER_IN_PROGRESS") {
            self.waiting_room.minutes_per_in_progress = minutes.parse().map_err(|_| {
                anyhow!("Invalid FRONTDESK_MINUTES_PER_IN_PROGRESS value: {}", minutes)
            })?;
        }

        Ok(())
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    // Validate log level
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    // Validate storage settings
    if config.storage.data_dir.as_os_str().is_empty() {
        return Err(anyhow!("Data directory cannot be empty"));
    }
    let keys = &config.storage.keys;
    for (name, key) in [
        ("slots", &keys.slots),
        ("unavailability", &keys.unavailability),
        ("queue", &keys.queue),
        ("history", &keys.history),
    ] {
        if key.is_empty() {
            return Err(anyhow!("Storage key '{}' cannot be empty", name));
        }
        if !is_valid_key(key) {
            return Err(anyhow!(
                "Storage key '{}' ({}) may only contain [A-Za-z0-9_-]",
                name,
                key
            ));
        }
    }

    // Validate scheduling settings
    if config.scheduling.default_slot_minutes == 0 {
        return Err(anyhow!("Default slot length must be greater than 0"));
    }
    if config.scheduling.day_start >= config.scheduling.day_end {
        return Err(anyhow!(
            "Day start {} must be before day end {}",
            config.scheduling.day_start.format("%H:%M"),
            config.scheduling.day_end.format("%H:%M")
        ));
    }

    // Validate waiting room settings
    config.waiting_room.validate()?;

    Ok(())
}
