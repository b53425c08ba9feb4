//! Statistics over completed waiting-room visits
//!
//! Aggregates the final waiting times recorded at checkout so callers can
//! report average and spread per provider.

use crate::waiting_room::entry::WaitingRoomHistoryRecord;
use serde::{Deserialize, Serialize};

/// Statistics for the waiting times of one provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaitTimeStats {
    /// Number of samples collected
    pub sample_count: u64,
    /// Sum of all waiting times (for calculating mean)
    pub sum_minutes: f64,
    /// Sum of squared waiting times (for calculating variance)
    pub sum_squared_minutes: f64,
    /// Minimum waiting time observed
    pub min_minutes: f64,
    /// Maximum waiting time observed
    pub max_minutes: f64,
}

impl WaitTimeStats {
    /// Create new empty statistics
    pub fn new() -> Self {
        Self {
            sample_count: 0,
            sum_minutes: 0.0,
            sum_squared_minutes: 0.0,
            min_minutes: f64::INFINITY,
            max_minutes: 0.0,
        }
    }

    /// Collect the waiting times of the given history records
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a WaitingRoomHistoryRecord>,
    ) -> Self {
        let mut stats = Self::new();
        for record in records {
            stats.add_sample(record.waiting_time_minutes);
        }
        stats
    }

    /// Add a new waiting time sample
    pub fn add_sample(&mut self, minutes: u32) {
        let minutes = f64::from(minutes);

        self.sample_count += 1;
        self.sum_minutes += minutes;
        self.sum_squared_minutes += minutes * minutes;
        self.min_minutes = self.min_minutes.min(minutes);
        self.max_minutes = self.max_minutes.max(minutes);
    }

    /// Arithmetic mean; 0 without samples
    pub fn mean(&self) -> f64 {
        if self.sample_count == 0 {
            return 0.0;
        }

        self.sum_minutes / self.sample_count as f64
    }

    /// Population standard deviation
    pub fn standard_deviation(&self) -> f64 {
        if self.sample_count <= 1 {
            return 0.0;
        }

        let mean = self.mean();
        let variance = (self.sum_squared_minutes / self.sample_count as f64) - (mean * mean);
        variance.max(0.0).sqrt()
    }

    /// Get minimum waiting time
    pub fn min(&self) -> f64 {
        if self.min_minutes == f64::INFINITY {
            0.0
        } else {
            self.min_minutes
        }
    }

    /// Get maximum waiting time
    pub fn max(&self) -> f64 {
        self.max_minutes
    }
}

impl Default for WaitTimeStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_time_stats_empty() {
        let stats = WaitTimeStats::new();
        assert_eq!(stats.sample_count, 0);
        assert_eq!(stats.mean(), 0.0);
        assert_eq!(stats.standard_deviation(), 0.0);
        assert_eq!(stats.min(), 0.0);
        assert_eq!(stats.max(), 0.0);
    }

    #[test]
    fn test_wait_time_stats_single_sample() {
        let mut stats = WaitTimeStats::new();
        stats.add_sample(20);

        assert_eq!(stats.sample_count, 1);
        assert_eq!(stats.mean(), 20.0);
        assert_eq!(stats.standard_deviation(), 0.0);
        assert_eq!(stats.min(), 20.0);
        assert_eq!(stats.max(), 20.0);
    }

    #[test]
    fn test_wait_time_stats_multiple_samples() {
        let mut stats = WaitTimeStats::new();
        stats.add_sample(10);
        stats.add_sample(20);
        stats.add_sample(30);

        assert_eq!(stats.sample_count, 3);
        assert_eq!(stats.mean(), 20.0);
        assert_eq!(stats.min(), 10.0);
        assert_eq!(stats.max(), 30.0);

        // Standard deviation should be around 8.16 minutes
        let std_dev = stats.standard_deviation();
        assert!(std_dev > 8.1 && std_dev < 8.2);
    }
}
