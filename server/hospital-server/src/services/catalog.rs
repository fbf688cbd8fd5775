use database_layer::{DatabaseResult, Medication, Patient, RecordStore};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Patient '{0}' has no recorded symptoms")]
    NoSymptoms(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AllergenStatus {
    Safe,
    ContainsAllergens,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AllergenCheck {
    pub medication: String,
    pub status: AllergenStatus,
}

/// Medications loaded for one request. Built explicitly and passed to
/// whoever needs it.
#[derive(Debug, Clone, Default)]
pub struct MedicationCatalog {
    medications: Vec<Medication>,
}

fn same_term(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

fn shares_any(left: &[String], right: &[String]) -> bool {
    left.iter().any(|l| right.iter().any(|r| same_term(l, r)))
}

impl MedicationCatalog {
    #[must_use]
    pub fn new(medications: Vec<Medication>) -> Self {
        Self { medications }
    }

    /// # Errors
    ///
    /// Whatever the record store fails with.
    pub async fn load(records: &dyn RecordStore) -> DatabaseResult<Self> {
        Ok(Self::new(records.list_medications().await?))
    }

    #[must_use]
    pub fn medications(&self) -> &[Medication] {
        &self.medications
    }

    /// Medications treating at least one of the patient's symptoms, minus
    /// those containing one of the patient's allergens.
    ///
    /// # Errors
    ///
    /// [`CatalogError::NoSymptoms`] when there is nothing to treat.
    pub fn recommend(&self, patient: &Patient) -> Result<Vec<Medication>, CatalogError> {
        if patient.symptoms.is_empty() {
            return Err(CatalogError::NoSymptoms(patient.id.clone()));
        }
        Ok(self
            .medications
            .iter()
            .filter(|m| shares_any(&m.treats, &patient.symptoms))
            .filter(|m| !shares_any(&m.allergens, &patient.allergies))
            .cloned()
            .collect())
    }
}

/// Label each of `medications` for `patient`.
#[must_use]
pub fn allergen_report(patient: &Patient, medications: &[Medication]) -> Vec<AllergenCheck> {
    medications
        .iter()
        .map(|m| AllergenCheck {
            medication: m.name.clone(),
            status: if shares_any(&m.allergens, &patient.allergies) {
                AllergenStatus::ContainsAllergens
            } else {
                AllergenStatus::Safe
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use database_layer::Condition;

    fn medication(name: &str, treats: &[&str], allergens: &[&str]) -> Medication {
        Medication {
            id: name.to_lowercase(),
            name: name.into(),
            dose: "500mg".into(),
            price: 4.5,
            expires_on: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            allergens: allergens.iter().map(ToString::to_string).collect(),
            treats: treats.iter().map(ToString::to_string).collect(),
        }
    }

    fn patient(symptoms: &[&str], allergies: &[&str]) -> Patient {
        Patient {
            id: "p1".into(),
            username: "ana".into(),
            password_hash: String::new(),
            first_name: "Ana".into(),
            last_name: "Lopez".into(),
            age: 40,
            gender: "f".into(),
            condition: Condition::Moderate,
            medical_history: vec![],
            symptoms: symptoms.iter().map(ToString::to_string).collect(),
            allergies: allergies.iter().map(ToString::to_string).collect(),
            doctor_id: None,
            nurse_id: None,
            room_number: None,
        }
    }

    fn catalog() -> MedicationCatalog {
        MedicationCatalog::new(vec![
            medication("Paracetamol", &["fever", "headache"], &[]),
            medication("Amoxicillin", &["infection", "fever"], &["penicillin"]),
            medication("Loratadine", &["sneezing"], &[]),
        ])
    }

    #[test]
    fn recommends_by_symptom_and_skips_allergens() {
        let names: Vec<_> = catalog()
            .recommend(&patient(&["Fever"], &["penicillin"]))
            .unwrap()
            .into_iter()
            .map(|m| m.name)
            .collect();
        assert_eq!(names, ["Paracetamol"]);
    }

    #[test]
    fn no_symptoms_is_an_error() {
        assert_eq!(
            catalog().recommend(&patient(&[], &[])),
            Err(CatalogError::NoSymptoms("p1".into()))
        );
    }

    #[test]
    fn report_labels_each_medication() {
        let catalog = catalog();
        let report = allergen_report(&patient(&["fever"], &["Penicillin"]), catalog.medications());
        assert_eq!(report.len(), 3);
        assert_eq!(report[0].status, AllergenStatus::Safe);
        assert_eq!(report[1].status, AllergenStatus::ContainsAllergens);
    }
}
