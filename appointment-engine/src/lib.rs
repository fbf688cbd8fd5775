//! Appointment scheduling for the hospital engine.
//!
//! An appointment is one record with a kind tag (`in_person`, `phone`,
//! `emergency`) and the one variant field that kind requires. The
//! [`AppointmentManager`] validates requests, resolves patients through a
//! [`PatientDirectory`], mints ids and drives the
//! `Requested -> Attended | Cancelled` lifecycle.
//!
//! ```rust,ignore
//! let manager = AppointmentManager::new(directory, Arc::new(RandomIdGenerator));
//! let appt = manager.create(request).await?;
//! let outcome = manager.fulfill(&appt.appointment_id)?;
//! println!("{}", outcome.message);
//! ```

pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod manager;
pub mod models;

pub use directory::{InMemoryPatientDirectory, PatientDirectory};
pub use error::{AppointmentError, DirectoryError, Result, SchedulingError, ValidationError};
pub use manager::{AppointmentListing, AppointmentManager, TransitionOutcome, TransitionResult};
pub use models::{
    parse_scheduled_at, Appointment, AppointmentKind, AppointmentStatus, AppointmentSummary,
    NewAppointment, PatientSummary, ValidatedAppointment, VariantDetails, SCHEDULED_AT_FORMAT,
    UNASSIGNED,
};
