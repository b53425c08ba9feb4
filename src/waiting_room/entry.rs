//! Waiting-room queue entries and history records

use crate::types::{
    Appointment, AppointmentId, Patient, PatientId, Priority, Provider, ProviderId, QueueStatus,
};
use crate::utils::minutes_between;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A checked-in patient in a provider's live queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingQueueEntry {
    pub appointment_id: AppointmentId,
    pub patient_id: PatientId,
    pub patient_name: String,
    pub provider_id: ProviderId,
    pub provider_name: String,
    pub checked_in_time: DateTime<Utc>,
    /// Derived; rewritten on every recomputation
    pub estimated_wait_minutes: u32,
    pub priority: Priority,
    pub status: QueueStatus,
}

impl WaitingQueueEntry {
    /// New `waiting` entry with no estimate yet
    pub fn new(
        appointment: &Appointment,
        patient: &Patient,
        provider: &Provider,
        priority: Priority,
        checked_in_time: DateTime<Utc>,
    ) -> Self {
        Self {
            appointment_id: appointment.id.clone(),
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            provider_id: provider.id.clone(),
            provider_name: provider.name.clone(),
            checked_in_time,
            estimated_wait_minutes: 0,
            priority,
            status: QueueStatus::Waiting,
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.status == QueueStatus::Waiting
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == QueueStatus::InProgress
    }
}

/// Snapshot of a queue entry taken at checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitingRoomHistoryRecord {
    #[serde(flatten)]
    pub entry: WaitingQueueEntry,
    pub checkout_time: DateTime<Utc>,
    /// Whole minutes between check-in and checkout
    pub waiting_time_minutes: u32,
}

impl WaitingRoomHistoryRecord {
    /// Archive an entry; the snapshot is marked completed
    pub fn complete(mut entry: WaitingQueueEntry, checkout_time: DateTime<Utc>) -> Self {
        let waiting_time_minutes = minutes_between(entry.checked_in_time, checkout_time);
        entry.status = QueueStatus::Completed;
        entry.estimated_wait_minutes = 0;

        Self {
            entry,
            checkout_time,
            waiting_time_minutes,
        }
    }

    pub fn provider_id(&self) -> &str {
        &self.entry.provider_id
    }

    pub fn appointment_id(&self) -> &str {
        &self.entry.appointment_id
    }
}
