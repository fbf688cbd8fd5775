use std::sync::Arc;

use appointment_engine::{DirectoryError, PatientDirectory, PatientSummary};
use async_trait::async_trait;
use database_layer::RecordStore;

/// Answers the appointment manager's patient lookups from the record store.
#[derive(Clone)]
pub struct RecordPatientDirectory {
    records: Arc<dyn RecordStore>,
}

impl RecordPatientDirectory {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }
}

#[async_trait]
impl PatientDirectory for RecordPatientDirectory {
    async fn lookup_patient(
        &self,
        patient_id: &str,
    ) -> Result<Option<PatientSummary>, DirectoryError> {
        let patient = self
            .records
            .get_patient(patient_id)
            .await
            .map_err(|e| DirectoryError(e.to_string()))?;
        Ok(patient.map(|p| PatientSummary {
            display_name: p.display_name(),
            patient_id: p.id,
        }))
    }
}
