use std::collections::HashMap;
use std::sync::Arc;

use crypto::IdGenerator;
use logger_redacted::redacted_info;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::directory::PatientDirectory;
use crate::error::{AppointmentError, Result, ValidationError};
use crate::lifecycle::{self, Transition};
use crate::models::{Appointment, AppointmentStatus, AppointmentSummary, NewAppointment};

/// Result of a successful cancel or fulfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionOutcome {
    pub message: String,
    pub appointment: Appointment,
}

pub type TransitionResult = std::result::Result<TransitionOutcome, AppointmentError>;

#[derive(Debug, Default)]
struct Ledger {
    order: Vec<Appointment>,
    index: HashMap<String, usize>,
}

impl Ledger {
    fn get_mut(&mut self, appointment_id: &str) -> Option<&mut Appointment> {
        let position = *self.index.get(appointment_id)?;
        self.order.get_mut(position)
    }
}

/// Owns every appointment of the process, in creation order.
///
/// One mutex guards the collection. It is never held across an `.await`:
/// `create` talks to the patient directory first and only then locks to
/// mint the id and append.
pub struct AppointmentManager {
    ledger: Mutex<Ledger>,
    directory: Arc<dyn PatientDirectory>,
    ids: Arc<dyn IdGenerator>,
}

impl AppointmentManager {
    pub fn new(directory: Arc<dyn PatientDirectory>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            ledger: Mutex::new(Ledger::default()),
            directory,
            ids,
        }
    }

    /// Validate `request`, resolve its patient and store a new appointment
    /// in the `Requested` state.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] for bad input or an unknown patient,
    /// `DirectoryUnavailable` when the patient lookup fails.
    pub async fn create(&self, request: NewAppointment) -> Result<Appointment> {
        let valid = request.validate()?;

        let patient = self
            .directory
            .lookup_patient(&valid.patient_id)
            .await?
            .ok_or_else(|| ValidationError::UnknownPatient(valid.patient_id.clone()))?;

        let appointment = {
            let mut ledger = self.ledger.lock();
            let appointment = Appointment {
                appointment_id: self.ids.generate_id(),
                patient,
                assigned_staff: valid.assigned_staff,
                scheduled_at: valid.scheduled_at,
                reason: valid.reason,
                status: AppointmentStatus::Requested,
                attended: false,
                details: valid.details,
            };
            let position = ledger.order.len();
            ledger
                .index
                .insert(appointment.appointment_id.clone(), position);
            ledger.order.push(appointment.clone());
            appointment
        };

        redacted_info!(
            { appointment_id = %appointment.appointment_id, kind = appointment.kind().tag() },
            "Appointment requested for patient {} at {} with {}",
            appointment.patient.patient_id,
            appointment.scheduled_at,
            appointment.assigned_staff
        );
        Ok(appointment)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown id, `InvalidTransition` when already terminal.
    pub fn cancel(&self, appointment_id: &str) -> TransitionResult {
        self.transition(appointment_id, Transition::Cancel)
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown id, `InvalidTransition` when already terminal.
    pub fn fulfill(&self, appointment_id: &str) -> TransitionResult {
        self.transition(appointment_id, Transition::Fulfill)
    }

    fn transition(&self, appointment_id: &str, transition: Transition) -> TransitionResult {
        let outcome = {
            let mut ledger = self.ledger.lock();
            let appointment = ledger
                .get_mut(appointment_id)
                .ok_or_else(|| AppointmentError::NotFound(appointment_id.to_string()))?;
            lifecycle::apply(appointment, transition).map(|message| TransitionOutcome {
                message,
                appointment: appointment.clone(),
            })
        };

        match &outcome {
            Ok(done) => redacted_info!(
                { appointment_id = %appointment_id, status = %done.appointment.status },
                "{}",
                done.message
            ),
            Err(e) => warn!(appointment_id = %appointment_id, transition = ?transition, "{}", e),
        }
        outcome
    }

    /// # Errors
    ///
    /// `NotFound` for an unknown id.
    pub fn get(&self, appointment_id: &str) -> std::result::Result<Appointment, AppointmentError> {
        let ledger = self.ledger.lock();
        ledger
            .index
            .get(appointment_id)
            .and_then(|&position| ledger.order.get(position))
            .cloned()
            .ok_or_else(|| AppointmentError::NotFound(appointment_id.to_string()))
    }

    /// Consistent snapshot of every appointment in creation order.
    #[must_use]
    pub fn list(&self) -> AppointmentListing {
        let snapshot: Arc<[Appointment]> = self.ledger.lock().order.clone().into();
        debug!(count = snapshot.len(), "Listing appointments");
        AppointmentListing { snapshot }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ledger.lock().order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Snapshot returned by [`AppointmentManager::list`].
///
/// Summaries are built while iterating. Every call to [`iter`](Self::iter)
/// starts again from the first appointment.
#[derive(Debug, Clone)]
pub struct AppointmentListing {
    snapshot: Arc<[Appointment]>,
}

impl AppointmentListing {
    pub fn iter(&self) -> impl Iterator<Item = AppointmentSummary> + '_ {
        self.snapshot.iter().map(Appointment::summary)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshot.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshot.is_empty()
    }
}

impl<'a> IntoIterator for &'a AppointmentListing {
    type Item = AppointmentSummary;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, Appointment>, fn(&Appointment) -> AppointmentSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshot.iter().map(Appointment::summary as fn(&Appointment) -> AppointmentSummary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{InMemoryPatientDirectory, MockPatientDirectory};
    use crate::error::{DirectoryError, SchedulingError};
    use crate::models::{AppointmentKind, PatientSummary};
    use crypto::{RandomIdGenerator, SequentialIdGenerator};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn directory() -> Arc<InMemoryPatientDirectory> {
        let directory = InMemoryPatientDirectory::new();
        directory.insert(PatientSummary {
            patient_id: "P1".into(),
            display_name: "Ana Ruiz".into(),
        });
        Arc::new(directory)
    }

    fn manager() -> AppointmentManager {
        AppointmentManager::new(directory(), Arc::new(RandomIdGenerator))
    }

    fn phone(number: &str) -> NewAppointment {
        NewAppointment {
            kind: "phone".into(),
            patient_id: "P1".into(),
            scheduled_at: "2025-06-01T10:30:00".into(),
            contact_phone: Some(number.into()),
            ..NewAppointment::default()
        }
    }

    fn in_person(location: &str) -> NewAppointment {
        NewAppointment {
            kind: "in_person".into(),
            patient_id: "P1".into(),
            assigned_staff: Some("dr-house".into()),
            scheduled_at: "2025-06-02T09:00:00".into(),
            location: Some(location.into()),
            ..NewAppointment::default()
        }
    }

    #[tokio::test]
    async fn test_phone_scenario() {
        let manager = manager();
        let created = manager.create(phone("555-1234")).await.unwrap();
        assert_eq!(created.status, AppointmentStatus::Requested);
        assert!(!created.attended);
        assert_eq!(created.kind(), AppointmentKind::Phone);
        assert_eq!(created.assigned_staff, "unassigned");

        let outcome = manager.fulfill(&created.appointment_id).unwrap();
        assert_eq!(outcome.appointment.status, AppointmentStatus::Attended);
        assert!(outcome.appointment.attended);
        assert!(outcome.message.contains("555-1234"));
    }

    #[tokio::test]
    async fn test_emergency_without_priority_rejected() {
        let manager = manager();
        let request = NewAppointment {
            kind: "urgencias".into(),
            patient_id: "P1".into(),
            scheduled_at: "2025-06-01T10:30:00".into(),
            ..NewAppointment::default()
        };
        let err = manager.create(request).await.unwrap_err();
        match err {
            SchedulingError::Validation(v) => assert_eq!(v.field(), "priority_level"),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(manager.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_patient_rejected() {
        let manager = manager();
        let mut request = phone("555-1234");
        request.patient_id = "P404".into();
        assert_eq!(
            manager.create(request).await.unwrap_err(),
            SchedulingError::Validation(ValidationError::UnknownPatient("P404".into()))
        );
    }

    #[tokio::test]
    async fn test_directory_failure() {
        let mut directory = MockPatientDirectory::new();
        directory
            .expect_lookup_patient()
            .times(1)
            .returning(|_| Err(DirectoryError("timeout".into())));
        let manager = AppointmentManager::new(Arc::new(directory), Arc::new(RandomIdGenerator));
        assert_eq!(
            manager.create(phone("555-1234")).await.unwrap_err(),
            SchedulingError::DirectoryUnavailable("timeout".into())
        );
    }

    #[tokio::test]
    async fn test_invalid_request_skips_directory() {
        let mut directory = MockPatientDirectory::new();
        directory.expect_lookup_patient().never();
        let manager = AppointmentManager::new(Arc::new(directory), Arc::new(RandomIdGenerator));
        let mut request = phone("555-1234");
        request.scheduled_at = "01/06/2025 10:30".into();
        assert!(matches!(
            manager.create(request).await,
            Err(SchedulingError::Validation(ValidationError::BadTimestamp(_)))
        ));
    }

    #[tokio::test]
    async fn test_double_transitions_fail() {
        let manager = manager();
        let a = manager.create(in_person("Room 101")).await.unwrap();
        let b = manager.create(phone("555-1234")).await.unwrap();

        let cancelled = manager.cancel(&a.appointment_id).unwrap();
        assert!(cancelled.message.contains("Room 101"));
        assert!(matches!(
            manager.cancel(&a.appointment_id),
            Err(AppointmentError::InvalidTransition { .. })
        ));
        assert!(matches!(
            manager.fulfill(&a.appointment_id),
            Err(AppointmentError::InvalidTransition { .. })
        ));

        manager.fulfill(&b.appointment_id).unwrap();
        assert!(matches!(
            manager.fulfill(&b.appointment_id),
            Err(AppointmentError::InvalidTransition { .. })
        ));
        assert!(matches!(
            manager.cancel(&b.appointment_id),
            Err(AppointmentError::InvalidTransition { .. })
        ));
    }

    #[tokio::test]
    async fn test_not_found_is_distinct() {
        let manager = manager();
        assert_eq!(
            manager.cancel("missing"),
            Err(AppointmentError::NotFound("missing".into()))
        );
        assert_eq!(
            manager.fulfill("missing"),
            Err(AppointmentError::NotFound("missing".into()))
        );
        assert!(manager.get("missing").is_err());
    }

    #[tokio::test]
    async fn test_listing_keeps_creation_order() {
        let manager = AppointmentManager::new(directory(), Arc::new(SequentialIdGenerator::new("appt")));
        for i in 0..5 {
            manager.create(phone(&format!("555-000{i}"))).await.unwrap();
        }
        manager.cancel("appt-2").unwrap();
        manager.fulfill("appt-4").unwrap();

        let listing = manager.list();
        let ids: Vec<String> = listing.iter().map(|s| s.appointment_id).collect();
        assert_eq!(ids, ["appt-1", "appt-2", "appt-3", "appt-4", "appt-5"]);

        // restartable
        assert_eq!(listing.iter().count(), 5);
        let statuses: Vec<AppointmentStatus> = (&listing).into_iter().map(|s| s.status).collect();
        assert_eq!(statuses[1], AppointmentStatus::Cancelled);
        assert_eq!(statuses[3], AppointmentStatus::Attended);
    }

    #[tokio::test]
    async fn test_listing_is_a_snapshot() {
        let manager = manager();
        manager.create(phone("555-1234")).await.unwrap();
        let listing = manager.list();
        manager.create(phone("555-9876")).await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(manager.list().len(), 2);
    }

    #[tokio::test]
    async fn test_ten_thousand_unique_ids() {
        let manager = manager();
        for _ in 0..10_000 {
            manager.create(phone("555-1234")).await.unwrap();
        }
        let ids: HashSet<String> = manager.list().iter().map(|s| s.appointment_id).collect();
        assert_eq!(ids.len(), 10_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_transitions_single_winner() {
        let manager = Arc::new(manager());
        let created = manager.create(phone("555-1234")).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..16 {
            let manager = Arc::clone(&manager);
            let id = created.appointment_id.clone();
            handles.push(tokio::spawn(async move {
                if i % 2 == 0 {
                    manager.cancel(&id).is_ok()
                } else {
                    manager.fulfill(&id).is_ok()
                }
            }));
        }
        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
        let final_state = manager.get(&created.appointment_id).unwrap();
        assert!(final_state.status.is_terminal());
        assert_eq!(final_state.attended, final_state.status == AppointmentStatus::Attended);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates() {
        let manager = Arc::new(manager());
        let mut handles = Vec::new();
        for _ in 0..64 {
            let manager = Arc::clone(&manager);
            handles.push(tokio::spawn(async move {
                manager.create(phone("555-1234")).await.map(|a| a.appointment_id)
            }));
        }
        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().unwrap());
        }
        assert_eq!(ids.len(), 64);
        assert_eq!(manager.len(), 64);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_missing_variant_field_rejected(
            kind in prop::sample::select(vec!["in_person", "presencial", "phone", "telefonica", "emergency", "urgencias"]),
            reason in proptest::option::of("[a-z ]{0,20}"),
        ) {
            let manager = manager();
            let request = NewAppointment {
                kind: kind.to_string(),
                patient_id: "P1".into(),
                scheduled_at: "2025-06-01T10:30:00".into(),
                reason,
                ..NewAppointment::default()
            };
            let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
            let err = runtime.block_on(manager.create(request)).unwrap_err();
            let expected: AppointmentKind = kind.parse().unwrap();
            prop_assert_eq!(
                err,
                SchedulingError::Validation(ValidationError::MissingVariantField {
                    kind: expected,
                    field: expected.required_field(),
                })
            );
        }
    }
}
