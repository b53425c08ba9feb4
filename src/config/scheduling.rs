//! Slot scheduling configuration

use crate::slots::SlotConflictPolicy;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Defaults applied when generating provider slots
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulingSettings {
    /// Slot length when none is given
    pub default_slot_minutes: u32,
    /// Start of the working day
    #[serde(with = "hhmm")]
    pub day_start: NaiveTime,
    /// End of the working day
    #[serde(with = "hhmm")]
    pub day_end: NaiveTime,
    /// Generate slots on Saturdays and Sundays
    pub include_weekends: bool,
    /// Handling of generated slots that overlap unavailability
    pub conflict_policy: SlotConflictPolicy,
}

impl Default for SchedulingSettings {
    fn default() -> Self {
        Self {
            default_slot_minutes: 30,
            day_start: NaiveTime::from_hms_opt(9, 0, 0).expect("09:00 is a valid time"),
            day_end: NaiveTime::from_hms_opt(17, 0, 0).expect("17:00 is a valid time"),
            include_weekends: false,
            conflict_policy: SlotConflictPolicy::Flag,
        }
    }
}

/// `HH:MM` (de)serialization for times of day
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(serde::de::Error::custom)
    }
}
