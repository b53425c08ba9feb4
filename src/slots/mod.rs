//! Provider time slots and unavailability
//!
//! Slots are generated from a provider's daily working window, then kept
//! consistent with recorded unavailability periods by the resolver.

pub mod generator;
pub mod period;
pub mod resolver;

pub use generator::{SlotConflictPolicy, SlotGenerationRequest, TimeSlot};
pub use period::UnavailabilityPeriod;
pub use resolver::TimeSlotResolver;
