use thiserror::Error;

use crate::models::{AppointmentKind, AppointmentStatus};

/// A create request that cannot become an appointment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown appointment kind '{0}'")]
    UnknownKind(String),

    #[error("{field} is required for {kind} appointments")]
    MissingVariantField {
        kind: AppointmentKind,
        field: &'static str,
    },

    #[error("scheduled_at must use the format YYYY-MM-DDTHH:MM:SS, got '{0}'")]
    BadTimestamp(String),

    #[error("Unknown patient '{0}'")]
    UnknownPatient(String),
}

impl ValidationError {
    /// Request field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::UnknownKind(_) => "kind",
            Self::MissingVariantField { field, .. } => field,
            Self::BadTimestamp(_) => "scheduled_at",
            Self::UnknownPatient(_) => "patient_id",
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppointmentError {
    #[error("Appointment '{0}' not found")]
    NotFound(String),

    #[error("Appointment '{appointment_id}' is already {status} and cannot change")]
    InvalidTransition {
        appointment_id: String,
        status: AppointmentStatus,
    },
}

/// Patient directory could not answer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("patient directory unavailable: {0}")]
pub struct DirectoryError(pub String);

/// Everything `AppointmentManager::create` can fail with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Patient directory unavailable")]
    DirectoryUnavailable(String),
}

impl From<DirectoryError> for SchedulingError {
    fn from(err: DirectoryError) -> Self {
        Self::DirectoryUnavailable(err.0)
    }
}

pub type Result<T> = std::result::Result<T, SchedulingError>;
