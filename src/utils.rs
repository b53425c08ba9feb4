//! Utility functions for the front desk core

use crate::error::ClinicError;
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Timelike, Utc, Weekday};
use uuid::Uuid;

/// Generate a new unique unavailability period ID
pub fn generate_period_id() -> String {
    Uuid::new_v4().to_string()
}

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Deterministic slot ID from provider, date and start time
pub fn slot_id(provider_id: &str, date: NaiveDate, start_time: NaiveTime) -> String {
    format!(
        "{}-{}-{}",
        provider_id,
        date.format("%Y%m%d"),
        start_time.format("%H%M")
    )
}

/// Whole minutes elapsed between two timestamps, never negative
pub fn minutes_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u32 {
    let minutes = to.signed_duration_since(from).num_minutes().max(0);
    u32::try_from(minutes).unwrap_or(u32::MAX)
}

/// Minutes since midnight, ignoring seconds
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Inverse of [`minute_of_day`]; `None` past the end of the day
pub fn time_from_minute_of_day(minute: u32) -> Option<NaiveTime> {
    NaiveTime::from_hms_opt(minute / 60, minute % 60, 0)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Parse a `YYYY-MM-DD` date for the named field
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ClinicError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ClinicError::validation(field, format!("'{}' is not a YYYY-MM-DD date", value))
    })
}

/// Parse an `HH:MM` time of day for the named field
pub fn parse_time_of_day(field: &str, value: &str) -> Result<NaiveTime, ClinicError> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| {
        ClinicError::validation(field, format!("'{}' is not an HH:MM time", value))
    })
}
