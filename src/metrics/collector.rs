//! Metrics collection using Prometheus
//!
//! This module provides metrics collection for the waiting room and the
//! slot resolver using Prometheus metrics.

use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge,
    IntGaugeVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Main metrics collector for the front desk core
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Waiting-room metrics
    queue_metrics: QueueMetrics,

    /// Time slot metrics
    slot_metrics: SlotMetrics,

    /// Performance metrics
    performance_metrics: PerformanceMetrics,
}

/// Waiting-room metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Total check-ins by provider
    pub check_ins_total: IntCounterVec,

    /// Total check-outs by provider
    pub check_outs_total: IntCounterVec,

    /// Check-ins rejected because the appointment was already queued
    pub duplicate_check_ins_total: IntCounter,

    /// Live queue depth by provider
    pub queue_depth: IntGaugeVec,

    /// Final waiting time at checkout
    pub waiting_time_minutes: HistogramVec,
}

/// Time slot metrics
#[derive(Clone)]
pub struct SlotMetrics {
    /// Slots generated by provider
    pub slots_generated_total: IntCounterVec,

    /// Booking attempts by outcome (booked, forced, conflict)
    pub bookings_total: IntCounterVec,

    /// Currently recorded unavailability periods
    pub unavailability_periods: IntGauge,
}

/// Performance metrics
#[derive(Clone)]
pub struct PerformanceMetrics {
    /// Wait time recomputation duration
    pub recompute_duration: Histogram,
}

impl MetricsCollector {
    /// Create a new metrics collector with default registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let queue_metrics = QueueMetrics::new(&registry)?;
        let slot_metrics = SlotMetrics::new(&registry)?;
        let performance_metrics = PerformanceMetrics::new(&registry)?;

        Ok(Self {
            registry,
            queue_metrics,
            slot_metrics,
            performance_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    pub fn slots(&self) -> &SlotMetrics {
        &self.slot_metrics
    }

    pub fn performance(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Record a successful check-in
    pub fn record_check_in(&self, provider_id: &str) {
        self.queue_metrics
            .check_ins_total
            .with_label_values(&[provider_id])
            .inc();
    }

    /// Record a rejected duplicate check-in
    pub fn record_duplicate_check_in(&self) {
        self.queue_metrics.duplicate_check_ins_total.inc();
    }

    /// Record a checkout and its final waiting time
    pub fn record_check_out(&self, provider_id: &str, waiting_time_minutes: u32) {
        self.queue_metrics
            .check_outs_total
            .with_label_values(&[provider_id])
            .inc();

        self.queue_metrics
            .waiting_time_minutes
            .with_label_values(&[provider_id])
            .observe(waiting_time_minutes as f64);
    }

    /// Set the live queue depth for a provider
    pub fn set_queue_depth(&self, provider_id: &str, depth: usize) {
        self.queue_metrics
            .queue_depth
            .with_label_values(&[provider_id])
            .set(depth as i64);
    }

    /// Record newly generated slots
    pub fn record_slots_generated(&self, provider_id: &str, count: usize) {
        self.slot_metrics
            .slots_generated_total
            .with_label_values(&[provider_id])
            .inc_by(count as u64);
    }

    /// Record a booking attempt outcome
    pub fn record_booking(&self, outcome: &str) {
        self.slot_metrics
            .bookings_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Set the number of recorded unavailability periods
    pub fn set_unavailability_periods(&self, count: usize) {
        self.slot_metrics.unavailability_periods.set(count as i64);
    }

    /// Record wait time recomputation duration
    pub fn record_recompute(&self, duration: Duration) {
        self.performance_metrics
            .recompute_duration
            .observe(duration.as_secs_f64());
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl QueueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let check_ins_total = IntCounterVec::new(
            Opts::new("frontdesk_check_ins_total", "Total waiting-room check-ins"),
            &["provider"],
        )?;
        registry.register(Box::new(check_ins_total.clone()))?;

        let check_outs_total = IntCounterVec::new(
            Opts::new("frontdesk_check_outs_total", "Total waiting-room check-outs"),
            &["provider"],
        )?;
        registry.register(Box::new(check_outs_total.clone()))?;

        let duplicate_check_ins_total = IntCounter::new(
            "frontdesk_duplicate_check_ins_total",
            "Check-ins rejected for appointments already in the queue",
        )?;
        registry.register(Box::new(duplicate_check_ins_total.clone()))?;

        let queue_depth = IntGaugeVec::new(
            Opts::new("frontdesk_queue_depth", "Live waiting-room entries"),
            &["provider"],
        )?;
        registry.register(Box::new(queue_depth.clone()))?;

        let waiting_time_minutes = HistogramVec::new(
            HistogramOpts::new(
                "frontdesk_waiting_time_minutes",
                "Minutes between check-in and checkout",
            )
            .buckets(vec![5.0, 10.0, 15.0, 30.0, 45.0, 60.0, 90.0, 120.0, 240.0]),
            &["provider"],
        )?;
        registry.register(Box::new(waiting_time_minutes.clone()))?;

        Ok(Self {
            check_ins_total,
            check_outs_total,
            duplicate_check_ins_total,
            queue_depth,
            waiting_time_minutes,
        })
    }
}

impl SlotMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let slots_generated_total = IntCounterVec::new(
            Opts::new("frontdesk_slots_generated_total", "Total time slots generated"),
            &["provider"],
        )?;
        registry.register(Box::new(slots_generated_total.clone()))?;

        let bookings_total = IntCounterVec::new(
            Opts::new("frontdesk_bookings_total", "Slot booking attempts by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(bookings_total.clone()))?;

        let unavailability_periods = IntGauge::new(
            "frontdesk_unavailability_periods",
            "Recorded provider unavailability periods",
        )?;
        registry.register(Box::new(unavailability_periods.clone()))?;

        Ok(Self {
            slots_generated_total,
            bookings_total,
            unavailability_periods,
        })
    }
}

impl PerformanceMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let recompute_duration = Histogram::with_opts(
            HistogramOpts::new(
                "frontdesk_recompute_duration_seconds",
                "Time spent recomputing estimated wait times",
            )
            .buckets(vec![0.00001, 0.0001, 0.001, 0.01, 0.1]),
        )?;
        registry.register(Box::new(recompute_duration.clone()))?;

        Ok(Self { recompute_duration })
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
