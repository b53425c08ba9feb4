//! Common types used throughout the front desk core

use crate::error::ClinicError;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Unique identifier for providers (doctors, nurses, therapists)
pub type ProviderId = String;

/// Unique identifier for patients
pub type PatientId = String;

/// Unique identifier for appointments
pub type AppointmentId = String;

/// Deterministic identifier for time slots
pub type SlotId = String;

/// Unique identifier for unavailability periods
pub type PeriodId = String;

/// Queue priority of a checked-in patient. Lower rank is seen sooner.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent = 0,
    #[default]
    Normal = 1,
    Low = 2,
}

impl Priority {
    /// Numeric rank (0 = urgent, 1 = normal, 2 = low)
    pub fn rank(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = ClinicError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Priority::Urgent),
            1 => Ok(Priority::Normal),
            2 => Ok(Priority::Low),
            other => Err(ClinicError::validation(
                "priority",
                format!("{} is not one of 0 (urgent), 1 (normal), 2 (low)", other),
            )),
        }
    }
}

impl FromStr for Priority {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "urgent" => Ok(Priority::Urgent),
            "normal" => Ok(Priority::Normal),
            "low" => Ok(Priority::Low),
            other => other
                .parse::<u8>()
                .map_err(|_| ClinicError::validation("priority", format!("unknown level '{}'", s)))
                .and_then(Priority::try_from),
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::Urgent => write!(f, "urgent"),
            Priority::Normal => write!(f, "normal"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// Status of a waiting-room entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueStatus {
    Waiting,
    InProgress,
    Completed,
}

impl std::fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueStatus::Waiting => write!(f, "waiting"),
            QueueStatus::InProgress => write!(f, "in-progress"),
            QueueStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Recurrence of an unavailability period. Stored, never expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
}

impl FromStr for RecurrencePattern {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(RecurrencePattern::Daily),
            "weekly" => Ok(RecurrencePattern::Weekly),
            "monthly" => Ok(RecurrencePattern::Monthly),
            _ => Err(ClinicError::validation(
                "recurrence_pattern",
                format!("unknown pattern '{}'", s),
            )),
        }
    }
}

/// Time-of-day coverage of an unavailability period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeWindow {
    AllDay,
    Timed { start: NaiveTime, end: NaiveTime },
}

impl TimeWindow {
    /// Half-open overlap with `[start, end)`. All-day windows overlap everything.
    pub fn overlaps(&self, start: NaiveTime, end: NaiveTime) -> bool {
        match *self {
            TimeWindow::AllDay => true,
            TimeWindow::Timed {
                start: window_start,
                end: window_end,
            } => start < window_end && end > window_start,
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, TimeWindow::AllDay)
    }

    /// Build from an optional pair of times; both missing means all day
    pub fn from_bounds(
        start: Option<NaiveTime>,
        end: Option<NaiveTime>,
    ) -> Result<Self, ClinicError> {
        match (start, end) {
            (None, None) => Ok(TimeWindow::AllDay),
            (Some(start), Some(end)) => Ok(TimeWindow::Timed { start, end }),
            (Some(_), None) => Err(ClinicError::validation(
                "end_time",
                "end time is required when a start time is given",
            )),
            (None, Some(_)) => Err(ClinicError::validation(
                "start_time",
                "start time is required when an end time is given",
            )),
        }
    }
}

/// Appointment reference handed over by the scheduling collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub provider_id: ProviderId,
}

/// Patient reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub name: String,
}

/// Provider reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: ProviderId,
    pub name: String,
}
