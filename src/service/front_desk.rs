//! Front desk service state
//!
//! This module wires the configured store, metrics collector, slot resolver
//! and waiting-room scheduler into one object that the binary drives.

use crate::config::AppConfig;
use crate::error::{ClinicError, Result};
use crate::metrics::MetricsCollector;
use crate::slots::{SlotGenerationRequest, TimeSlotResolver};
use crate::storage::{JsonFileStore, KeyValueStore};
use crate::types::ProviderId;
use crate::waiting_room::{LinearWaitTimeEstimator, WaitingRoomScheduler};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::info;

/// Snapshot of the front desk for status reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrontDeskStats {
    /// Providers with slots, periods, live entries or history
    pub providers: Vec<ProviderId>,
    /// Total generated slots
    pub total_slots: usize,
    /// Slots currently bookable
    pub bookable_slots: usize,
    /// Recorded unavailability periods
    pub unavailability_periods: usize,
    /// Live entries waiting to be seen
    pub patients_waiting: usize,
    /// Live entries being seen
    pub patients_in_progress: usize,
    /// Completed visits on record
    pub completed_visits: usize,
}

/// Main front desk state containing both components
pub struct FrontDesk {
    /// Application configuration
    config: AppConfig,

    /// Persistence shared by both components
    store: Arc<dyn KeyValueStore>,

    /// Metrics collector
    metrics: Arc<MetricsCollector>,

    /// Slot and unavailability bookkeeping
    resolver: TimeSlotResolver,

    /// Live waiting room
    scheduler: WaitingRoomScheduler,
}

impl FrontDesk {
    /// Open the front desk over the configured data directory
    pub fn open(config: &AppConfig) -> Result<Self> {
        info!(
            "Opening front desk data directory {}",
            config.storage.data_dir.display()
        );
        let store = Arc::new(JsonFileStore::open(&config.storage.data_dir)?);
        Self::with_store(config.clone(), store)
    }

    /// Build the front desk over an injected store
    pub fn with_store(config: AppConfig, store: Arc<dyn KeyValueStore>) -> Result<Self> {
        let metrics = Arc::new(MetricsCollector::new().map_err(|e| {
            ClinicError::InternalError {
                message: format!("Failed to create metrics collector: {}", e),
            }
        })?);

        let resolver = TimeSlotResolver::new(
            store.clone(),
            config.storage.keys.clone(),
            config.scheduling.conflict_policy,
        )?
        .with_metrics(metrics.clone());

        let estimator = LinearWaitTimeEstimator::new(config.waiting_room.clone())?;
        let scheduler = WaitingRoomScheduler::new(
            store.clone(),
            config.storage.keys.clone(),
            Box::new(estimator),
        )?
        .with_metrics(metrics.clone());

        info!(
            "Front desk '{}' ready (conflict policy: {})",
            config.service.name, config.scheduling.conflict_policy
        );

        Ok(Self {
            config,
            store,
            metrics,
            resolver,
            scheduler,
        })
    }

    /// Slot generation request using the configured working day
    pub fn generation_request(
        &self,
        provider_id: impl Into<ProviderId>,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> SlotGenerationRequest {
        let scheduling = &self.config.scheduling;
        SlotGenerationRequest {
            provider_id: provider_id.into(),
            start_date,
            end_date,
            daily_start: scheduling.day_start,
            daily_end: scheduling.day_end,
            slot_duration_minutes: scheduling.default_slot_minutes,
            include_weekends: scheduling.include_weekends,
        }
    }

    /// Gather a status snapshot across both components
    pub fn stats(&self) -> FrontDeskStats {
        let mut providers = BTreeSet::new();
        let mut total_slots = 0;
        let mut bookable_slots = 0;
        let mut unavailability_periods = 0;

        for slot in self.resolver.all_slots() {
            providers.insert(slot.provider_id.clone());
            total_slots += 1;
            if slot.is_bookable() {
                bookable_slots += 1;
            }
        }
        for period in self.resolver.all_unavailability() {
            providers.insert(period.provider_id.clone());
            unavailability_periods += 1;
        }

        let live = self.scheduler.live_queue();
        providers.extend(live.iter().map(|entry| entry.provider_id.clone()));
        let history = self.scheduler.history();
        providers.extend(history.iter().map(|record| record.entry.provider_id.clone()));

        FrontDeskStats {
            providers: providers.into_iter().collect(),
            total_slots,
            bookable_slots,
            unavailability_periods,
            patients_waiting: live.iter().filter(|entry| entry.is_waiting()).count(),
            patients_in_progress: live.iter().filter(|entry| entry.is_in_progress()).count(),
            completed_visits: history.len(),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the backing store
    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        self.store.clone()
    }

    /// Get metrics collector
    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    pub fn resolver(&self) -> &TimeSlotResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut TimeSlotResolver {
        &mut self.resolver
    }

    pub fn scheduler(&self) -> &WaitingRoomScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut WaitingRoomScheduler {
        &mut self.scheduler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slots::UnavailabilityPeriod;
    use crate::storage::InMemoryStore;
    use crate::types::{Appointment, Patient, Provider};
    use chrono::NaiveTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn front_desk(config: AppConfig) -> FrontDesk {
        FrontDesk::with_store(config, Arc::new(InMemoryStore::new())).unwrap()
    }

    #[test]
    fn test_generation_request_uses_configured_day() {
        let mut config = AppConfig::default();
        config.scheduling.default_slot_minutes = 20;
        config.scheduling.day_start = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let desk = front_desk(config);

        let request = desk.generation_request("dr-lee", date(10), date(11));
        assert_eq!(request.slot_duration_minutes, 20);
        assert_eq!(request.daily_start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(request.daily_end, NaiveTime::from_hms_opt(17, 0, 0).unwrap());
        assert!(!request.include_weekends);
    }

    #[test]
    fn test_invalid_wait_time_config_rejected() {
        let mut config = AppConfig::default();
        config.waiting_room.minutes_per_waiting = 0;

        let result = FrontDesk::with_store(config, Arc::new(InMemoryStore::new()));
        assert!(result.is_err());
    }

    #[test]
    fn test_stats_cover_both_components() {
        let mut desk = front_desk(AppConfig::default());

        let request = desk.generation_request("dr-lee", date(10), date(10));
        desk.resolver_mut().generate_slots(&request).unwrap();
        desk.resolver_mut()
            .add_unavailability(UnavailabilityPeriod::all_day("dr-kim", date(12), "Leave"))
            .unwrap();

        desk.scheduler_mut()
            .check_in(
                &Appointment {
                    id: "appt-1".to_string(),
                    patient_id: "pat-1".to_string(),
                    provider_id: "dr-park".to_string(),
                },
                &Patient {
                    id: "pat-1".to_string(),
                    name: "Ada Moss".to_string(),
                },
                &Provider {
                    id: "dr-park".to_string(),
                    name: "Dr. Park".to_string(),
                },
            )
            .unwrap();

        let stats = desk.stats();
        assert_eq!(stats.providers, vec!["dr-kim", "dr-lee", "dr-park"]);
        assert_eq!(stats.total_slots, 16);
        assert_eq!(stats.bookable_slots, 16);
        assert_eq!(stats.unavailability_periods, 1);
        assert_eq!(stats.patients_waiting, 1);
        assert_eq!(stats.patients_in_progress, 0);
        assert_eq!(stats.completed_visits, 0);

        let mut stored = desk.store().keys().unwrap();
        stored.sort();
        assert_eq!(
            stored,
            vec!["time_slots", "unavailability_periods", "waiting_queue"]
        );
    }
}
