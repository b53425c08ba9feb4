//! Time slot resolver
//!
//! This module provides the TimeSlotResolver that materializes provider slots
//! and keeps their availability consistent with unavailability periods.
//! Both collections are hydrated from the key-value store at construction and
//! written back in full after every mutation.

use crate::config::StorageKeys;
use crate::error::{ClinicError, Result};
use crate::metrics::MetricsCollector;
use crate::slots::generator::{SlotConflictPolicy, SlotGenerationRequest, TimeSlot};
use crate::slots::period::UnavailabilityPeriod;
use crate::storage::{load_collection, save_collection, KeyValueStore};
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Slot and unavailability bookkeeping for all providers
pub struct TimeSlotResolver {
    slots: Vec<TimeSlot>,
    periods: Vec<UnavailabilityPeriod>,
    policy: SlotConflictPolicy,
    store: Arc<dyn KeyValueStore>,
    keys: StorageKeys,
    metrics: Option<Arc<MetricsCollector>>,
}

impl TimeSlotResolver {
    /// Create a resolver, loading existing slots and periods from the store
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        keys: StorageKeys,
        policy: SlotConflictPolicy,
    ) -> Result<Self> {
        let slots: Vec<TimeSlot> = load_collection(store.as_ref(), &keys.slots)?;
        let periods: Vec<UnavailabilityPeriod> =
            load_collection(store.as_ref(), &keys.unavailability)?;

        info!(
            "Loaded {} time slots and {} unavailability periods",
            slots.len(),
            periods.len()
        );

        Ok(Self {
            slots,
            periods,
            policy,
            store,
            keys,
            metrics: None,
        })
    }

    /// Attach a metrics collector
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        metrics.set_unavailability_periods(self.periods.len());
        self.metrics = Some(metrics);
        self
    }

    pub fn policy(&self) -> SlotConflictPolicy {
        self.policy
    }

    /// Generate slots for a provider over a date range
    ///
    /// Returns only the newly created slots; candidates whose id already exists
    /// are skipped. Conflicting candidates are flagged or omitted per policy.
    pub fn generate_slots(&mut self, request: &SlotGenerationRequest) -> Result<Vec<TimeSlot>> {
        request.validate()?;

        let existing: HashSet<&str> = self.slots.iter().map(|s| s.id.as_str()).collect();
        let mut created = Vec::new();
        let mut skipped_existing = 0usize;
        let mut omitted = 0usize;

        for mut slot in request.candidates() {
            if existing.contains(slot.id.as_str()) {
                skipped_existing += 1;
                continue;
            }

            if self.is_overlapping(&slot.provider_id, slot.date, Some(slot.times())) {
                match self.policy {
                    SlotConflictPolicy::Flag => slot.is_available = false,
                    SlotConflictPolicy::Omit => {
                        omitted += 1;
                        continue;
                    }
                }
            }

            created.push(slot);
        }

        if skipped_existing > 0 || omitted > 0 {
            debug!(
                "Slot generation for '{}' skipped {} existing and omitted {} conflicting candidates",
                request.provider_id, skipped_existing, omitted
            );
        }

        self.slots.extend(created.iter().cloned());

        info!(
            "Generated {} slots for provider '{}' ({} to {}, {}-{}, {} min)",
            created.len(),
            request.provider_id,
            request.start_date,
            request.end_date,
            request.daily_start.format("%H:%M"),
            request.daily_end.format("%H:%M"),
            request.slot_duration_minutes
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_slots_generated(&request.provider_id, created.len());
        }

        self.persist_slots();
        Ok(created)
    }

    /// Whether any period for the provider blocks `date` (and `[start, end)` if given)
    pub fn is_overlapping(
        &self,
        provider_id: &str,
        date: NaiveDate,
        times: Option<(NaiveTime, NaiveTime)>,
    ) -> bool {
        self.periods
            .iter()
            .any(|period| period.provider_id == provider_id && period.covers(date, times))
    }

    /// Record an unavailability period and flag the unbooked slots it covers
    pub fn add_unavailability(
        &mut self,
        period: UnavailabilityPeriod,
    ) -> Result<UnavailabilityPeriod> {
        period.validate()?;

        if self.periods.iter().any(|p| p.id == period.id) {
            return Err(ClinicError::Conflict {
                reason: format!("unavailability period {} already exists", period.id),
            }
            .into());
        }

        let mut flagged = 0usize;
        for slot in self.slots.iter_mut() {
            if slot.provider_id != period.provider_id || slot.is_booked {
                continue;
            }
            if period.covers(slot.date, Some(slot.times())) && slot.is_available {
                slot.is_available = false;
                flagged += 1;
            }
        }

        let booked_conflicts = self
            .slots
            .iter()
            .filter(|slot| {
                slot.provider_id == period.provider_id
                    && slot.is_booked
                    && period.covers(slot.date, Some(slot.times()))
            })
            .count();
        if booked_conflicts > 0 {
            warn!(
                "Unavailability {} overlaps {} booked slots for '{}'; bookings left in place",
                period.id, booked_conflicts, period.provider_id
            );
        }

        info!(
            "Added unavailability {} for '{}' ({} to {}, {}): {} slots flagged",
            period.id,
            period.provider_id,
            period.start_date,
            period.end_date,
            period.reason,
            flagged
        );

        self.periods.push(period.clone());

        if let Some(metrics) = &self.metrics {
            metrics.set_unavailability_periods(self.periods.len());
        }

        self.persist_periods();
        self.persist_slots();
        Ok(period)
    }

    /// Remove a period and restore slots no other period still covers
    ///
    /// Returns false when the id is unknown.
    pub fn remove_unavailability(&mut self, period_id: &str) -> bool {
        let Some(index) = self.periods.iter().position(|p| p.id == period_id) else {
            debug!("Unavailability {} not found; nothing removed", period_id);
            return false;
        };

        let removed = self.periods.remove(index);

        let affected: Vec<usize> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                slot.provider_id == removed.provider_id
                    && !slot.is_booked
                    && removed.covers(slot.date, Some(slot.times()))
            })
            .map(|(i, _)| i)
            .collect();

        let mut restored = 0usize;
        for i in affected {
            let (provider_id, date, times) = {
                let slot = &self.slots[i];
                (slot.provider_id.clone(), slot.date, slot.times())
            };
            let still_blocked = self.is_overlapping(&provider_id, date, Some(times));
            let slot = &mut self.slots[i];
            if !still_blocked && !slot.is_available {
                slot.is_available = true;
                restored += 1;
            }
        }

        info!(
            "Removed unavailability {} for '{}': {} slots restored",
            removed.id, removed.provider_id, restored
        );

        if let Some(metrics) = &self.metrics {
            metrics.set_unavailability_periods(self.periods.len());
        }

        self.persist_periods();
        self.persist_slots();
        true
    }

    /// Available, unbooked slots for a provider on a date, ordered by start time
    pub fn get_available_slots(&self, provider_id: &str, date: NaiveDate) -> Vec<TimeSlot> {
        let mut slots: Vec<TimeSlot> = self
            .slots
            .iter()
            .filter(|slot| slot.provider_id == provider_id && slot.date == date)
            .filter(|slot| slot.is_bookable())
            .cloned()
            .collect();
        slots.sort_by_key(|slot| slot.start_time);
        slots
    }

    /// Book a slot
    ///
    /// Booking an already booked slot is always a conflict. Booking an
    /// unavailable slot is a conflict unless `force` is set.
    pub fn book_slot(&mut self, slot_id: &str, force: bool) -> Result<TimeSlot> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.id == slot_id)
            .ok_or_else(|| ClinicError::SlotNotFound {
                slot_id: slot_id.to_string(),
            })?;

        if slot.is_booked {
            if let Some(metrics) = &self.metrics {
                metrics.record_booking("conflict");
            }
            return Err(ClinicError::Conflict {
                reason: format!("slot {} is already booked", slot_id),
            }
            .into());
        }

        let outcome = if slot.is_available {
            "booked"
        } else if force {
            warn!(
                "Force-booking unavailable slot {} for '{}'",
                slot.id, slot.provider_id
            );
            "forced"
        } else {
            if let Some(metrics) = &self.metrics {
                metrics.record_booking("conflict");
            }
            return Err(ClinicError::Conflict {
                reason: format!("slot {} is unavailable", slot_id),
            }
            .into());
        };

        slot.is_booked = true;
        let booked = slot.clone();

        info!(
            "Booked slot {} ({} {}-{})",
            booked.id,
            booked.date,
            booked.start_time.format("%H:%M"),
            booked.end_time.format("%H:%M")
        );

        if let Some(metrics) = &self.metrics {
            metrics.record_booking(outcome);
        }

        self.persist_slots();
        Ok(booked)
    }

    /// Delete a slot; returns false when the id is unknown
    pub fn remove_slot(&mut self, slot_id: &str) -> bool {
        let before = self.slots.len();
        self.slots.retain(|slot| slot.id != slot_id);

        if self.slots.len() == before {
            return false;
        }

        info!("Removed slot {}", slot_id);
        self.persist_slots();
        true
    }

    pub fn slot(&self, slot_id: &str) -> Option<&TimeSlot> {
        self.slots.iter().find(|slot| slot.id == slot_id)
    }

    /// All slots of a provider in (date, start) order
    pub fn slots_for(&self, provider_id: &str) -> Vec<TimeSlot> {
        let mut slots: Vec<TimeSlot> = self
            .slots
            .iter()
            .filter(|slot| slot.provider_id == provider_id)
            .cloned()
            .collect();
        slots.sort_by_key(|slot| (slot.date, slot.start_time));
        slots
    }

    /// All periods of a provider ordered by start date
    pub fn unavailability_for(&self, provider_id: &str) -> Vec<UnavailabilityPeriod> {
        let mut periods: Vec<UnavailabilityPeriod> = self
            .periods
            .iter()
            .filter(|period| period.provider_id == provider_id)
            .cloned()
            .collect();
        periods.sort_by_key(|period| (period.start_date, period.end_date));
        periods
    }

    pub fn all_slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn all_unavailability(&self) -> &[UnavailabilityPeriod] {
        &self.periods
    }

    fn persist_slots(&self) {
        if let Err(e) = save_collection(self.store.as_ref(), &self.keys.slots, &self.slots) {
            warn!("Failed to persist time slots: {}", e);
        }
    }

    fn persist_periods(&self) {
        if let Err(e) = save_collection(
            self.store.as_ref(),
            &self.keys.unavailability,
            &self.periods,
        ) {
            warn!("Failed to persist unavailability periods: {}", e);
        }
    }
}
