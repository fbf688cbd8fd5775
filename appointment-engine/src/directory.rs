use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::DirectoryError;
use crate::models::PatientSummary;

/// Read-only view of the patient records, used to validate and enrich
/// appointment requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PatientDirectory: Send + Sync {
    async fn lookup_patient(&self, patient_id: &str)
        -> Result<Option<PatientSummary>, DirectoryError>;
}

#[derive(Debug, Default)]
pub struct InMemoryPatientDirectory {
    patients: RwLock<HashMap<String, PatientSummary>>,
}

impl InMemoryPatientDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, patient: PatientSummary) {
        self.patients
            .write()
            .insert(patient.patient_id.clone(), patient);
    }
}

#[async_trait]
impl PatientDirectory for InMemoryPatientDirectory {
    async fn lookup_patient(
        &self,
        patient_id: &str,
    ) -> Result<Option<PatientSummary>, DirectoryError> {
        Ok(self.patients.read().get(patient_id).cloned())
    }
}
