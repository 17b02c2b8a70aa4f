use chrono::{DateTime, Utc};
use thiserror::Error;

use shared_models::ModelError;

use crate::models::{AppointmentStatus, ProviderId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppointmentError {
    #[error("Appointment has no start date time")]
    MissingStartDateTime,

    #[error("Appointment has no uuid")]
    MissingIdentifier,

    #[error("Appointment end {end} is before its start {start}")]
    InvalidTimeWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("Invalid appointment status transition from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Appointment has no status change to undo")]
    NoStatusHistory,

    #[error("Provider {0} is not assigned to this appointment")]
    ProviderNotAssigned(ProviderId),

    #[error("Invalid recurring pattern: {0}")]
    InvalidRecurringPattern(String),

    #[error("Recurring series exceeds {limit} occurrences")]
    TooManyOccurrences { limit: usize },

    #[error(transparent)]
    Model(#[from] ModelError),
}
