//! Provider unavailability periods

use crate::error::ClinicError;
use crate::types::{PeriodId, ProviderId, RecurrencePattern, TimeWindow};
use crate::utils::generate_period_id;
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A span of days (all day or within a daily window) a provider cannot see patients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnavailabilityPeriod {
    pub id: PeriodId,
    pub provider_id: ProviderId,
    /// Inclusive
    pub start_date: NaiveDate,
    /// Inclusive
    pub end_date: NaiveDate,
    pub window: TimeWindow,
    pub reason: String,
    pub is_recurring: bool,
    pub recurrence_pattern: Option<RecurrencePattern>,
}

impl UnavailabilityPeriod {
    /// Create a one-off period with a fresh id
    pub fn new(
        provider_id: impl Into<ProviderId>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        window: TimeWindow,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_period_id(),
            provider_id: provider_id.into(),
            start_date,
            end_date,
            window,
            reason: reason.into(),
            is_recurring: false,
            recurrence_pattern: None,
        }
    }

    /// Single all-day period
    pub fn all_day(
        provider_id: impl Into<ProviderId>,
        date: NaiveDate,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(provider_id, date, date, TimeWindow::AllDay, reason)
    }

    /// Mark the period as recurring. The pattern is recorded only.
    pub fn recurring(mut self, pattern: RecurrencePattern) -> Self {
        self.is_recurring = true;
        self.recurrence_pattern = Some(pattern);
        self
    }

    pub fn validate(&self) -> crate::error::Result<()> {
        if self.provider_id.trim().is_empty() {
            return Err(ClinicError::validation("provider_id", "must not be empty").into());
        }

        if self.start_date > self.end_date {
            return Err(ClinicError::validation(
                "start_date",
                format!(
                    "start date {} is after end date {}",
                    self.start_date, self.end_date
                ),
            )
            .into());
        }

        if let TimeWindow::Timed { start, end } = self.window {
            if start >= end {
                return Err(ClinicError::validation(
                    "start_time",
                    format!("start time {} must be before end time {}", start, end),
                )
                .into());
            }
        }

        if self.is_recurring && self.recurrence_pattern.is_none() {
            return Err(ClinicError::validation(
                "recurrence_pattern",
                "recurring periods need a pattern",
            )
            .into());
        }

        Ok(())
    }

    pub fn covers_date(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }

    /// Whether the period blocks `date`, optionally restricted to `[start, end)`
    pub fn covers(&self, date: NaiveDate, times: Option<(NaiveTime, NaiveTime)>) -> bool {
        if !self.covers_date(date) {
            return false;
        }

        match times {
            Some((start, end)) => self.window.overlaps(start, end),
            None => true,
        }
    }
}
