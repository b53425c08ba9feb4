//! Waiting-room scheduler
//!
//! This module provides the WaitingRoomScheduler that maintains the live
//! per-provider queue, orders it by priority and arrival, and recomputes
//! estimated wait times after every mutation. Checked-out entries are archived
//! to an append-only history used for average wait time reporting.

use crate::config::StorageKeys;
use crate::error::{ClinicError, Result};
use crate::metrics::MetricsCollector;
use crate::storage::{load_collection, save_collection, KeyValueStore};
use crate::types::{Appointment, Patient, Priority, Provider, QueueStatus};
use crate::utils::current_timestamp;
use crate::waiting_room::entry::{WaitingQueueEntry, WaitingRoomHistoryRecord};
use crate::waiting_room::estimator::WaitTimeEstimator;
use crate::waiting_room::ordering::{queue_order, recompute_wait_times};
use crate::waiting_room::statistics::WaitTimeStats;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Live waiting-room queue and visit history for all providers
pub struct WaitingRoomScheduler {
    queue: Vec<WaitingQueueEntry>,
    history: Vec<WaitingRoomHistoryRecord>,
    estimator: Box<dyn WaitTimeEstimator>,
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    metrics: Option<Arc<MetricsCollector>>,
}

impl WaitingRoomScheduler {
    /// Create a scheduler, loading the live queue and history from the store
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        keys: StorageKeys,
        estimator: Box<dyn WaitTimeEstimator>,
    ) -> Result<Self> {
        let queue: Vec<WaitingQueueEntry> = load_collection(store.as_ref(), &keys.queue)?;
        let history: Vec<WaitingRoomHistoryRecord> =
            load_collection(store.as_ref(), &keys.history)?;

        info!(
            "Loaded waiting room with {} live entries and {} history records",
            queue.len(),
            history.len()
        );

        let mut scheduler = Self {
            queue,
            history,
            estimator,
            store,
            keys,
            metrics: None,
        };
        scheduler.recompute_wait_times();
        Ok(scheduler)
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        for provider_id in self.provider_ids() {
            metrics.set_queue_depth(&provider_id, self.depth_of(&provider_id));
        }
        self.metrics = Some(metrics);
        self
    }

    /// Check a patient in now with normal priority
    pub fn check_in(
        &mut self,
        appointment: &Appointment,
        patient: &Patient,
        provider: &Provider,
    ) -> Result<WaitingQueueEntry> {
        self.check_in_at(
            appointment,
            patient,
            provider,
            Priority::Normal,
            current_timestamp(),
        )
    }

    /// Check a patient in with an explicit priority and check-in time
    ///
    /// Rejects an appointment that already has a live entry, and an appointment
    /// that does not belong to the given patient and provider.
    pub fn check_in_at(
        &mut self,
        appointment: &Appointment,
        patient: &Patient,
        provider: &Provider,
        priority: Priority,
        checked_in_time: DateTime<Utc>,
    ) -> Result<WaitingQueueEntry> {
        if appointment.id.trim().is_empty() {
            return Err(ClinicError::validation("appointment_id", "must not be empty").into());
        }
        if appointment.patient_id != patient.id {
            return Err(ClinicError::validation(
                "patient_id",
                format!(
                    "appointment {} belongs to patient {}, not {}",
                    appointment.id, appointment.patient_id, patient.id
                ),
            )
            .into());
        }
        if appointment.provider_id != provider.id {
            return Err(ClinicError::validation(
                "provider_id",
                format!(
                    "appointment {} is with provider {}, not {}",
                    appointment.id, appointment.provider_id, provider.id
                ),
            )
            .into());
        }

        if self.is_in_queue(&appointment.id) {
            warn!(
                "Rejected duplicate check-in for appointment {}",
                appointment.id
            );
            if let Some(metrics) = &self.metrics {
                metrics.record_duplicate_check_in();
            }
            return Err(ClinicError::AlreadyCheckedIn {
                appointment_id: appointment.id.clone(),
            }
            .into());
        }

        self.queue.push(WaitingQueueEntry::new(
            appointment,
            patient,
            provider,
            priority,
            checked_in_time,
        ));
        self.recompute_wait_times();

        let entry = self
            .entry(&appointment.id)
            .cloned()
            .ok_or_else(|| ClinicError::InternalError {
                message: format!("Entry for {} lost during recomputation", appointment.id),
            })?;

        info!(
            "Checked in '{}' for '{}' (appointment {}, priority {}, est. {} min)",
            entry.patient_name,
            entry.provider_name,
            entry.appointment_id,
            entry.priority,
            entry.estimated_wait_minutes
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_check_in(&entry.provider_id);
        }
        self.update_depth(&entry.provider_id);
        self.persist_queue();

        Ok(entry)
    }

    /// Move a waiting entry to in-progress
    ///
    /// Returns false when no entry matches or the entry is not waiting.
    pub fn start_appointment(&mut self, appointment_id: &str) -> bool {
        let Some(entry) = self
            .queue
            .iter_mut()
            .find(|entry| entry.appointment_id == appointment_id)
        else {
            debug!("No queue entry for appointment {}", appointment_id);
            return false;
        };

        if entry.status != QueueStatus::Waiting {
            debug!(
                "Appointment {} is {}, not waiting; start ignored",
                appointment_id, entry.status
            );
            return false;
        }

        entry.status = QueueStatus::InProgress;
        info!(
            "Started appointment {} with '{}'",
            appointment_id, entry.provider_name
        );

        self.recompute_wait_times();
        self.persist_queue();
        true
    }

    /// Check a patient out now
    pub fn check_out(&mut self, appointment_id: &str) -> Option<WaitingRoomHistoryRecord> {
        self.check_out_at(appointment_id, current_timestamp())
    }

    /// Check a patient out at an explicit time and archive the visit
    ///
    /// Returns None when no entry matches.
    pub fn check_out_at(
        &mut self,
        appointment_id: &str,
        checkout_time: DateTime<Utc>,
    ) -> Option<WaitingRoomHistoryRecord> {
        let index = self
            .queue
            .iter()
            .position(|entry| entry.appointment_id == appointment_id)?;
        let entry = self.queue.remove(index);

        if entry.is_waiting() {
            warn!(
                "Checking out appointment {} that was never started",
                appointment_id
            );
        }

        let record = WaitingRoomHistoryRecord::complete(entry, checkout_time);
        info!(
            "Checked out appointment {} for '{}' after {} min",
            appointment_id, record.entry.provider_name, record.waiting_time_minutes
        );

        self.history.push(record.clone());
        self.recompute_wait_times();

        if let Some(metrics) = &self.metrics {
            metrics.record_check_out(record.provider_id(), record.waiting_time_minutes);
        }
        self.update_depth(record.provider_id());
        self.persist_queue();
        self.persist_history();

        Some(record)
    }

    /// Change the priority of a live entry
    ///
    /// Returns false when no entry matches.
    pub fn set_priority(&mut self, appointment_id: &str, priority: Priority) -> bool {
        let Some(entry) = self
            .queue
            .iter_mut()
            .find(|entry| entry.appointment_id == appointment_id)
        else {
            debug!("No queue entry for appointment {}", appointment_id);
            return false;
        };

        let previous = entry.priority;
        entry.priority = priority;
        info!(
            "Priority of appointment {} changed from {} to {}",
            appointment_id, previous, priority
        );

        self.recompute_wait_times();
        self.persist_queue();
        true
    }

    /// Reorder every provider queue and rewrite all estimates
    pub fn recompute_wait_times(&mut self) {
        let timer = self.metrics.as_ref().map(|metrics| metrics.start_timer());

        let entries = std::mem::take(&mut self.queue);
        self.queue = recompute_wait_times(entries, self.estimator.as_ref());

        debug!("Recomputed wait times for {} live entries", self.queue.len());

        if let (Some(metrics), Some(timer)) = (&self.metrics, timer) {
            metrics.record_recompute(timer.stop());
        }
    }

    /// Mean final waiting time for a provider; 0 without history
    pub fn average_wait_time(&self, provider_id: &str) -> f64 {
        self.wait_time_stats(provider_id).mean()
    }

    /// Waiting time statistics for a provider
    pub fn wait_time_stats(&self, provider_id: &str) -> WaitTimeStats {
        WaitTimeStats::from_records(
            self.history
                .iter()
                .filter(|record| record.provider_id() == provider_id),
        )
    }

    /// Live entries for a provider in queue order
    pub fn queue_for(&self, provider_id: &str) -> Vec<WaitingQueueEntry> {
        let mut entries: Vec<WaitingQueueEntry> = self
            .queue
            .iter()
            .filter(|entry| entry.provider_id == provider_id)
            .cloned()
            .collect();
        entries.sort_by(queue_order);
        entries
    }

    /// Completed visits for a provider in checkout order
    pub fn history_for(&self, provider_id: &str) -> Vec<WaitingRoomHistoryRecord> {
        self.history
            .iter()
            .filter(|record| record.provider_id() == provider_id)
            .cloned()
            .collect()
    }

    pub fn is_in_queue(&self, appointment_id: &str) -> bool {
        self.entry(appointment_id).is_some()
    }

    pub fn entry(&self, appointment_id: &str) -> Option<&WaitingQueueEntry> {
        self.queue
            .iter()
            .find(|entry| entry.appointment_id == appointment_id)
    }

    /// All live entries, grouped by provider
    pub fn live_queue(&self) -> &[WaitingQueueEntry] {
        &self.queue
    }

    pub fn history(&self) -> &[WaitingRoomHistoryRecord] {
        &self.history
    }

    fn provider_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .queue
            .iter()
            .map(|entry| entry.provider_id.clone())
            .collect();
        ids.dedup();
        ids
    }

    fn depth_of(&self, provider_id: &str) -> usize {
        self.queue
            .iter()
            .filter(|entry| entry.provider_id == provider_id)
            .count()
    }

    fn update_depth(&self, provider_id: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.set_queue_depth(provider_id, self.depth_of(provider_id));
        }
    }

    fn persist_queue(&self) {
        if let Err(e) = save_collection(self.store.as_ref(), &self.keys.queue, &self.queue) {
            warn!("Failed to persist waiting queue: {}", e);
        }
    }

    fn persist_history(&self) {
        if let Err(e) = save_collection(self.store.as_ref(), &self.keys.history, &self.history) {
            warn!("Failed to persist waiting room history: {}", e);
        }
    }
}
