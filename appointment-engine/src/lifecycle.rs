//! Appointment state machine.
//!
//! ```text
//! Requested --fulfill--> Attended
//! Requested --cancel---> Cancelled
//! ```
//!
//! Attended and Cancelled are terminal. The human-readable outcome depends
//! on the appointment kind, which is matched here rather than dispatched.

use crate::error::AppointmentError;
use crate::models::{Appointment, AppointmentStatus, VariantDetails, SCHEDULED_AT_FORMAT};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Cancel,
    Fulfill,
}

/// Where `transition` leads from `status`, if anywhere.
#[must_use]
pub fn next_status(status: AppointmentStatus, transition: Transition) -> Option<AppointmentStatus> {
    match (status, transition) {
        (AppointmentStatus::Requested, Transition::Cancel) => Some(AppointmentStatus::Cancelled),
        (AppointmentStatus::Requested, Transition::Fulfill) => Some(AppointmentStatus::Attended),
        (AppointmentStatus::Attended | AppointmentStatus::Cancelled, _) => None,
    }
}

/// Apply `transition` in place and return the outcome message.
///
/// # Errors
///
/// [`AppointmentError::InvalidTransition`] when the appointment is terminal.
/// The appointment is left untouched in that case.
pub fn apply(appointment: &mut Appointment, transition: Transition) -> Result<String, AppointmentError> {
    let next = next_status(appointment.status, transition).ok_or_else(|| {
        AppointmentError::InvalidTransition {
            appointment_id: appointment.appointment_id.clone(),
            status: appointment.status,
        }
    })?;

    appointment.status = next;
    appointment.attended = next == AppointmentStatus::Attended;

    Ok(match transition {
        Transition::Cancel => cancellation_message(appointment),
        Transition::Fulfill => fulfillment_message(appointment),
    })
}

#[must_use]
pub fn cancellation_message(appointment: &Appointment) -> String {
    match &appointment.details {
        VariantDetails::InPerson { location } => format!(
            "In-person appointment {} on {} at {} has been cancelled",
            appointment.appointment_id,
            appointment.scheduled_at.format(SCHEDULED_AT_FORMAT),
            location
        ),
        VariantDetails::Phone { .. } => format!(
            "Phone appointment {} has been cancelled",
            appointment.appointment_id
        ),
        VariantDetails::Emergency { .. } => format!(
            "Emergency appointment {} has been cancelled",
            appointment.appointment_id
        ),
    }
}

#[must_use]
pub fn fulfillment_message(appointment: &Appointment) -> String {
    match &appointment.details {
        VariantDetails::InPerson { location } => {
            format!("The patient is being attended in person at {location}")
        }
        VariantDetails::Phone { contact_phone } => {
            format!("The patient is being attended by phone at {contact_phone}")
        }
        VariantDetails::Emergency { priority_level } => {
            format!("The patient is being attended in emergency with priority {priority_level}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PatientSummary;
    use chrono::NaiveDateTime;

    fn appointment(details: VariantDetails) -> Appointment {
        Appointment {
            appointment_id: "a1".into(),
            patient: PatientSummary {
                patient_id: "P1".into(),
                display_name: "Ana Ruiz".into(),
            },
            assigned_staff: "unassigned".into(),
            scheduled_at: NaiveDateTime::parse_from_str("2025-06-01T10:30:00", SCHEDULED_AT_FORMAT)
                .unwrap(),
            reason: None,
            status: AppointmentStatus::Requested,
            attended: false,
            details,
        }
    }

    #[test]
    fn terminal_states_have_no_edges() {
        for status in [AppointmentStatus::Attended, AppointmentStatus::Cancelled] {
            assert_eq!(next_status(status, Transition::Cancel), None);
            assert_eq!(next_status(status, Transition::Fulfill), None);
        }
    }

    #[test]
    fn cancel_in_person_mentions_when_and_where() {
        let mut appt = appointment(VariantDetails::InPerson {
            location: "Room 101".into(),
        });
        let message = apply(&mut appt, Transition::Cancel).unwrap();
        assert!(message.contains("Room 101"));
        assert!(message.contains("2025-06-01T10:30:00"));
        assert_eq!(appt.status, AppointmentStatus::Cancelled);
        assert!(!appt.attended);
    }

    #[test]
    fn fulfill_phone_mentions_number() {
        let mut appt = appointment(VariantDetails::Phone {
            contact_phone: "555-1234".into(),
        });
        let message = apply(&mut appt, Transition::Fulfill).unwrap();
        assert!(message.contains("555-1234"));
        assert_eq!(appt.status, AppointmentStatus::Attended);
        assert!(appt.attended);
    }

    #[test]
    fn fulfill_emergency_mentions_priority() {
        let mut appt = appointment(VariantDetails::Emergency {
            priority_level: "high".into(),
        });
        assert!(apply(&mut appt, Transition::Fulfill).unwrap().contains("high"));
    }

    #[test]
    fn failed_transition_leaves_state() {
        let mut appt = appointment(VariantDetails::Emergency {
            priority_level: "high".into(),
        });
        apply(&mut appt, Transition::Cancel).unwrap();
        let before = appt.clone();
        let err = apply(&mut appt, Transition::Fulfill).unwrap_err();
        assert_eq!(
            err,
            AppointmentError::InvalidTransition {
                appointment_id: "a1".into(),
                status: AppointmentStatus::Cancelled,
            }
        );
        assert_eq!(appt, before);
    }
}
