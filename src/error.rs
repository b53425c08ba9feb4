//! Error types for the front desk core
//!
//! This module defines all error types using anyhow for consistent error handling
//! throughout the application. Missing entities are reported through sentinels
//! (`false` / `None`) by the components; these errors cover validation, conflicts
//! and infrastructure failures.

/// Result type alias for convenience
pub type Result<T> = anyhow::Result<T>;

/// Custom error types for specific scheduling scenarios
#[derive(Debug, thiserror::Error)]
pub enum ClinicError {
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("Time slot not found: {slot_id}")]
    SlotNotFound { slot_id: String },

    #[error("Scheduling conflict: {reason}")]
    Conflict { reason: String },

    #[error("Appointment already checked in: {appointment_id}")]
    AlreadyCheckedIn { appointment_id: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    #[error("Internal service error: {message}")]
    InternalError { message: String },
}

impl ClinicError {
    /// Shorthand for a validation failure on a named field
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
