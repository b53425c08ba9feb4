//! Waiting-room queue management
//!
//! This module handles patient check-in, priority ordering, wait time
//! estimation, and the visit history recorded at checkout.

pub mod entry;
pub mod estimator;
pub mod ordering;
pub mod scheduler;
pub mod statistics;

pub use entry::{WaitingQueueEntry, WaitingRoomHistoryRecord};
pub use estimator::{LinearWaitTimeEstimator, QueueAhead, WaitTimeConfig, WaitTimeEstimator};
pub use ordering::{queue_order, recompute_wait_times};
pub use scheduler::WaitingRoomScheduler;
pub use statistics::WaitTimeStats;
