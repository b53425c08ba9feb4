//! Estimated wait time calculation
//!
//! This module turns a patient's position in the provider queue into an
//! estimated wait, based on how many patients ahead are still waiting and how
//! many are already being seen.

use crate::error::ClinicError;
use serde::{Deserialize, Serialize};

/// Configuration for wait time estimates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitTimeConfig {
    /// Minutes added for each waiting patient ahead
    pub minutes_per_waiting: u32,
    /// Minutes added for each in-progress patient ahead
    pub minutes_per_in_progress: u32,
}

impl Default for WaitTimeConfig {
    fn default() -> Self {
        Self {
            minutes_per_waiting: 15,
            minutes_per_in_progress: 5,
        }
    }
}

impl WaitTimeConfig {
    /// Validate configuration values
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.minutes_per_waiting == 0 {
            return Err(ClinicError::ConfigurationError {
                message: "minutes_per_waiting must be greater than 0".to_string(),
            }
            .into());
        }

        // A patient being seen is closer to done than one still waiting
        if self.minutes_per_in_progress > self.minutes_per_waiting {
            return Err(ClinicError::ConfigurationError {
                message: "minutes_per_in_progress must not exceed minutes_per_waiting"
                    .to_string(),
            }
            .into());
        }

        Ok(())
    }
}

/// Patients ahead of a given position in a provider queue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueAhead {
    pub waiting: usize,
    pub in_progress: usize,
}

/// Trait for estimating wait times from queue position
pub trait WaitTimeEstimator: Send + Sync {
    /// Estimated wait in minutes for a patient with `ahead` in front
    fn estimate_minutes(&self, ahead: QueueAhead) -> u32;

    /// Get the current configuration
    fn config(&self) -> &WaitTimeConfig;
}

/// Fixed per-patient estimate: `waiting * w + in_progress * p`
#[derive(Debug, Clone)]
pub struct LinearWaitTimeEstimator {
    config: WaitTimeConfig,
}

impl LinearWaitTimeEstimator {
    pub fn new(config: WaitTimeConfig) -> crate::error::Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }
}

impl Default for LinearWaitTimeEstimator {
    fn default() -> Self {
        Self {
            config: WaitTimeConfig::default(),
        }
    }
}

impl WaitTimeEstimator for LinearWaitTimeEstimator {
    fn estimate_minutes(&self, ahead: QueueAhead) -> u32 {
        let waiting = (ahead.waiting as u64) * u64::from(self.config.minutes_per_waiting);
        let in_progress =
            (ahead.in_progress as u64) * u64::from(self.config.minutes_per_in_progress);
        u32::try_from(waiting + in_progress).unwrap_or(u32::MAX)
    }

    fn config(&self) -> &WaitTimeConfig {
        &self.config
    }
}
