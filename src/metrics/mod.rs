//! Metrics for the front desk core
//!
//! This module provides Prometheus metrics collection for queue activity,
//! slot generation and booking outcomes.

pub mod collector;

pub use collector::{
    MetricsCollector, MetricsTimer, PerformanceMetrics, QueueMetrics, SlotMetrics,
};
