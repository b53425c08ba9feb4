//! Test fixtures and builders for integration testing
#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use frontdesk::config::AppConfig;
use frontdesk::storage::{InMemoryStore, KeyValueStore};
use frontdesk::types::{Appointment, Patient, Provider};
use frontdesk::FrontDesk;
use std::sync::Arc;

/// Appointment together with the patient and provider it references
#[derive(Debug, Clone)]
pub struct Visit {
    pub appointment: Appointment,
    pub patient: Patient,
    pub provider: Provider,
}

impl Visit {
    /// Visit for `appointment_id` with a patient derived from the id
    pub fn new(appointment_id: &str, provider_id: &str) -> Self {
        let patient_id = format!("pat-{}", appointment_id);
        Self {
            appointment: Appointment {
                id: appointment_id.to_string(),
                patient_id: patient_id.clone(),
                provider_id: provider_id.to_string(),
            },
            patient: Patient {
                id: patient_id,
                name: format!("Patient {}", appointment_id),
            },
            provider: Provider {
                id: provider_id.to_string(),
                name: format!("Dr. {}", provider_id),
            },
        }
    }

    pub fn with_patient_name(mut self, name: &str) -> Self {
        self.patient.name = name.to_string();
        self
    }
}

/// Deterministic clock: minute offsets from a fixed start
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    start: DateTime<Utc>,
}

impl FixedClock {
    /// Clock starting at 2024-06-10 09:00 UTC (a Monday)
    pub fn new() -> Self {
        Self {
            start: Utc.with_ymd_and_hms(2024, 6, 10, 9, 0, 0).unwrap(),
        }
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn at(&self, minutes: i64) -> DateTime<Utc> {
        self.start + Duration::minutes(minutes)
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new()
    }
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

/// Front desk with default configuration over a fresh in-memory store
pub fn in_memory_desk() -> (FrontDesk, Arc<dyn KeyValueStore>) {
    desk_with_config(AppConfig::default())
}

pub fn desk_with_config(config: AppConfig) -> (FrontDesk, Arc<dyn KeyValueStore>) {
    let store: Arc<dyn KeyValueStore> = Arc::new(InMemoryStore::new());
    let desk = FrontDesk::with_store(config, store.clone()).unwrap();
    (desk, store)
}
