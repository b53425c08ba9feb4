//! Time slot model and candidate generation
//!
//! Candidates are produced in (date, start time) order. Each day is filled with
//! back-to-back slots from the daily start; a trailing partial slot is dropped.

use crate::error::ClinicError;
use crate::types::{ProviderId, SlotId};
use crate::utils::{is_weekend, minute_of_day, slot_id, time_from_minute_of_day};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A bookable interval on one date for one provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub id: SlotId,
    pub provider_id: ProviderId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub is_available: bool,
    pub is_booked: bool,
}

impl TimeSlot {
    /// New unbooked, available slot with its deterministic id
    pub fn new(
        provider_id: impl Into<ProviderId>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Self {
        let provider_id = provider_id.into();
        Self {
            id: slot_id(&provider_id, date, start_time),
            provider_id,
            date,
            start_time,
            end_time,
            is_available: true,
            is_booked: false,
        }
    }

    pub fn is_bookable(&self) -> bool {
        self.is_available && !self.is_booked
    }

    pub fn times(&self) -> (NaiveTime, NaiveTime) {
        (self.start_time, self.end_time)
    }
}

/// What to do with a generated slot that overlaps an unavailability period
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotConflictPolicy {
    /// Generate it with `is_available = false`
    #[default]
    Flag,
    /// Do not generate it
    Omit,
}

impl std::fmt::Display for SlotConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SlotConflictPolicy::Flag => write!(f, "flag"),
            SlotConflictPolicy::Omit => write!(f, "omit"),
        }
    }
}

impl std::str::FromStr for SlotConflictPolicy {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "flag" => Ok(SlotConflictPolicy::Flag),
            "omit" => Ok(SlotConflictPolicy::Omit),
            _ => Err(ClinicError::validation(
                "conflict_policy",
                format!("unknown policy '{}' (expected flag or omit)", s),
            )),
        }
    }
}

/// Parameters for bulk slot generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotGenerationRequest {
    pub provider_id: ProviderId,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub daily_start: NaiveTime,
    pub daily_end: NaiveTime,
    pub slot_duration_minutes: u32,
    pub include_weekends: bool,
}

impl SlotGenerationRequest {
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

        if minute_of_day(self.daily_start) >= minute_of_day(self.daily_end) {
            return Err(ClinicError::validation(
                "daily_start",
                format!(
                    "daily start {} must be before daily end {}",
                    self.daily_start.format("%H:%M"),
                    self.daily_end.format("%H:%M")
                ),
            )
            .into());
        }

        if self.slot_duration_minutes == 0 {
            return Err(
                ClinicError::validation("slot_duration_minutes", "must be positive").into(),
            );
        }

        Ok(())
    }

    /// All candidate slots in (date, start) order, before conflict handling
    pub fn candidates(&self) -> Vec<TimeSlot> {
        let day_start = minute_of_day(self.daily_start);
        let day_end = minute_of_day(self.daily_end);
        let duration = self.slot_duration_minutes;

        let mut slots = Vec::new();
        let days = self
            .start_date
            .iter_days()
            .take_while(|date| *date <= self.end_date);

        for date in days {
            if !self.include_weekends && is_weekend(date) {
                continue;
            }

            let mut current = day_start;
            while current.saturating_add(duration) <= day_end {
                let (Some(start), Some(end)) = (
                    time_from_minute_of_day(current),
                    time_from_minute_of_day(current + duration),
                ) else {
                    break;
                };

                slots.push(TimeSlot::new(self.provider_id.clone(), date, start, end));
                current += duration;
            }
        }

        slots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn request(
        from: u32,
        to: u32,
        start: NaiveTime,
        end: NaiveTime,
        minutes: u32,
    ) -> SlotGenerationRequest {
        SlotGenerationRequest {
            provider_id: "dr-lee".to_string(),
            start_date: date(from),
            end_date: date(to),
            daily_start: start,
            daily_end: end,
            slot_duration_minutes: minutes,
            include_weekends: false,
        }
    }

    #[test]
    fn test_two_weekdays_of_half_hour_slots() {
        let slots = request(10, 11, time(9, 0), time(10, 0), 30).candidates();

        let triples: Vec<_> = slots
            .iter()
            .map(|s| (s.date, s.start_time, s.end_time))
            .collect();
        assert_eq!(
            triples,
            vec![
                (date(10), time(9, 0), time(9, 30)),
                (date(10), time(9, 30), time(10, 0)),
                (date(11), time(9, 0), time(9, 30)),
                (date(11), time(9, 30), time(10, 0)),
            ]
        );
        assert!(slots.iter().all(|s| s.is_available && !s.is_booked));
    }

    #[test]
    fn test_partial_trailing_slot_is_dropped() {
        let slots = request(10, 10, time(9, 0), time(10, 0), 25).candidates();

        assert_eq!(slots.len(), 2);
        assert_eq!(slots[1].end_time, time(9, 50));
        assert!(slots.iter().all(|s| s.end_time <= time(10, 0)));
    }

    #[test]
    fn test_weekends_skipped_unless_included() {
        // 2024-06-07 (Fri) .. 2024-06-10 (Mon)
        let mut req = request(7, 10, time(9, 0), time(10, 0), 60);
        let weekdays_only = req.candidates();
        assert_eq!(weekdays_only.len(), 2);
        assert!(weekdays_only.iter().all(|s| !is_weekend(s.date)));

        req.include_weekends = true;
        assert_eq!(req.candidates().len(), 4);
    }

    #[test]
    fn test_slot_ending_at_midnight_boundary() {
        let slots = request(10, 10, time(22, 0), time(23, 59), 60).candidates();
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].end_time, time(23, 0));
    }

    #[test]
    fn test_validation_names_the_field() {
        let cases = vec![
            (request(11, 10, time(9, 0), time(10, 0), 30), "start_date"),
            (request(10, 10, time(10, 0), time(9, 0), 30), "daily_start"),
            (request(10, 10, time(9, 0), time(10, 0), 0), "slot_duration_minutes"),
        ];

        for (req, expected_field) in cases {
            let err = req.validate().unwrap_err();
            match err.downcast_ref::<ClinicError>() {
                Some(ClinicError::Validation { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_conflict_policy_parsing() {
        assert_eq!("omit".parse::<SlotConflictPolicy>().unwrap(), SlotConflictPolicy::Omit);
        assert_eq!("FLAG".parse::<SlotConflictPolicy>().unwrap(), SlotConflictPolicy::Flag);
        assert!("drop".parse::<SlotConflictPolicy>().is_err());
    }
}
