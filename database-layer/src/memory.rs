use std::collections::BTreeMap;

use async_trait::async_trait;
use auth_identity::{CredentialRecord, Role};
use parking_lot::RwLock;

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{Aide, Medication, Patient, Room, Sip, StaffKind, StaffMember};
use crate::repository::RecordStore;

#[derive(Debug, Default)]
struct Tables {
    patients: BTreeMap<String, Patient>,
    doctors: BTreeMap<String, StaffMember>,
    nurses: BTreeMap<String, StaffMember>,
    aides: BTreeMap<String, Aide>,
    rooms: BTreeMap<i32, Room>,
    sips: BTreeMap<String, Sip>,
    medications: BTreeMap<String, Medication>,
}

impl Tables {
    fn staff(&self, kind: StaffKind) -> &BTreeMap<String, StaffMember> {
        match kind {
            StaffKind::Doctor => &self.doctors,
            StaffKind::Nurse => &self.nurses,
        }
    }

    fn staff_mut(&mut self, kind: StaffKind) -> &mut BTreeMap<String, StaffMember> {
        match kind {
            StaffKind::Doctor => &mut self.doctors,
            StaffKind::Nurse => &mut self.nurses,
        }
    }

    fn occupancy(&self, room_number: i32, except_patient: &str) -> usize {
        self.patients
            .values()
            .filter(|p| p.room_number == Some(room_number) && p.id != except_patient)
            .count()
    }
}

/// Record store kept in process memory. Used when no database URL is
/// configured and by the test suites.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    tables: RwLock<Tables>,
}

impl InMemoryRecordStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn conflict(message: String) -> DatabaseError {
    DatabaseError::Conflict(message)
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert_patient(&self, patient: Patient) -> DatabaseResult<Patient> {
        let mut tables = self.tables.write();
        if tables.patients.contains_key(&patient.id) {
            return Err(conflict(format!("patient '{}' already exists", patient.id)));
        }
        if tables.patients.values().any(|p| p.username == patient.username) {
            return Err(conflict(format!("username '{}' is taken", patient.username)));
        }
        tables.patients.insert(patient.id.clone(), patient.clone());
        Ok(patient)
    }

    async fn list_patients(&self) -> DatabaseResult<Vec<Patient>> {
        Ok(self.tables.read().patients.values().cloned().collect())
    }

    async fn get_patient(&self, id: &str) -> DatabaseResult<Option<Patient>> {
        Ok(self.tables.read().patients.get(id).cloned())
    }

    async fn delete_patient(&self, id: &str) -> DatabaseResult<()> {
        let mut tables = self.tables.write();
        tables
            .patients
            .remove(id)
            .ok_or_else(|| DatabaseError::not_found("patient", id))?;
        tables.sips.remove(id);
        Ok(())
    }

    async fn insert_staff(&self, kind: StaffKind, member: StaffMember) -> DatabaseResult<StaffMember> {
        let mut tables = self.tables.write();
        let staff = tables.staff_mut(kind);
        if staff.contains_key(&member.id) {
            return Err(conflict(format!("{} '{}' already exists", kind.entity(), member.id)));
        }
        if staff.values().any(|m| m.username == member.username) {
            return Err(conflict(format!("username '{}' is taken", member.username)));
        }
        staff.insert(member.id.clone(), member.clone());
        Ok(member)
    }

    async fn list_staff(&self, kind: StaffKind) -> DatabaseResult<Vec<StaffMember>> {
        Ok(self.tables.read().staff(kind).values().cloned().collect())
    }

    async fn get_staff(&self, kind: StaffKind, id: &str) -> DatabaseResult<Option<StaffMember>> {
        Ok(self.tables.read().staff(kind).get(id).cloned())
    }

    async fn delete_staff(&self, kind: StaffKind, id: &str) -> DatabaseResult<()> {
        let mut tables = self.tables.write();
        tables
            .staff_mut(kind)
            .remove(id)
            .ok_or_else(|| DatabaseError::not_found(kind.entity(), id))?;
        for patient in tables.patients.values_mut() {
            let link = match kind {
                StaffKind::Doctor => &mut patient.doctor_id,
                StaffKind::Nurse => &mut patient.nurse_id,
            };
            if link.as_deref() == Some(id) {
                *link = None;
            }
        }
        if kind == StaffKind::Nurse {
            for aide in tables.aides.values_mut() {
                if aide.nurse_id.as_deref() == Some(id) {
                    aide.nurse_id = None;
                }
            }
        }
        Ok(())
    }

    async fn insert_aide(&self, aide: Aide) -> DatabaseResult<Aide> {
        let mut tables = self.tables.write();
        if tables.aides.contains_key(&aide.id) {
            return Err(conflict(format!("aide '{}' already exists", aide.id)));
        }
        if let Some(nurse_id) = &aide.nurse_id {
            if !tables.nurses.contains_key(nurse_id) {
                return Err(DatabaseError::not_found("nurse", nurse_id));
            }
            if tables
                .aides
                .values()
                .any(|a| a.nurse_id.as_ref() == Some(nurse_id))
            {
                return Err(conflict(format!("nurse '{nurse_id}' already has an aide")));
            }
        }
        tables.aides.insert(aide.id.clone(), aide.clone());
        Ok(aide)
    }

    async fn list_aides(&self) -> DatabaseResult<Vec<Aide>> {
        Ok(self.tables.read().aides.values().cloned().collect())
    }

    async fn delete_aide(&self, id: &str) -> DatabaseResult<()> {
        self.tables
            .write()
            .aides
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("aide", id))
    }

    async fn insert_room(&self, room: Room) -> DatabaseResult<Room> {
        let mut tables = self.tables.write();
        if tables.rooms.contains_key(&room.number) {
            return Err(conflict(format!("room {} already exists", room.number)));
        }
        tables.rooms.insert(room.number, room.clone());
        Ok(room)
    }

    async fn list_rooms(&self) -> DatabaseResult<Vec<Room>> {
        Ok(self.tables.read().rooms.values().cloned().collect())
    }

    async fn clean_room(&self, number: i32) -> DatabaseResult<Room> {
        let mut tables = self.tables.write();
        let room = tables
            .rooms
            .get_mut(&number)
            .ok_or_else(|| DatabaseError::not_found("room", number))?;
        room.clean = true;
        Ok(room.clone())
    }

    async fn delete_room(&self, number: i32) -> DatabaseResult<()> {
        let mut tables = self.tables.write();
        tables
            .rooms
            .remove(&number)
            .ok_or_else(|| DatabaseError::not_found("room", number))?;
        for patient in tables.patients.values_mut() {
            if patient.room_number == Some(number) {
                patient.room_number = None;
            }
        }
        Ok(())
    }

    async fn assign_doctor(&self, patient_id: &str, doctor_id: &str) -> DatabaseResult<Patient> {
        let mut tables = self.tables.write();
        if !tables.doctors.contains_key(doctor_id) {
            return Err(DatabaseError::not_found("doctor", doctor_id));
        }
        let patient = tables
            .patients
            .get_mut(patient_id)
            .ok_or_else(|| DatabaseError::not_found("patient", patient_id))?;
        patient.doctor_id = Some(doctor_id.to_string());
        Ok(patient.clone())
    }

    async fn assign_room(&self, patient_id: &str, room_number: i32) -> DatabaseResult<Patient> {
        let mut tables = self.tables.write();
        if !tables.patients.contains_key(patient_id) {
            return Err(DatabaseError::not_found("patient", patient_id));
        }
        let room = tables
            .rooms
            .get(&room_number)
            .cloned()
            .ok_or_else(|| DatabaseError::not_found("room", room_number))?;
        if !room.clean {
            return Err(conflict(format!("room {room_number} is not clean")));
        }
        let occupied = i64::try_from(tables.occupancy(room_number, patient_id)).unwrap_or(i64::MAX);
        if occupied >= i64::from(room.capacity) {
            return Err(conflict(format!("room {room_number} is full")));
        }
        let patient = tables
            .patients
            .get_mut(patient_id)
            .ok_or_else(|| DatabaseError::not_found("patient", patient_id))?;
        patient.room_number = Some(room_number);
        Ok(patient.clone())
    }

    async fn create_sip(&self, sip: Sip) -> DatabaseResult<Sip> {
        let mut tables = self.tables.write();
        if !tables.patients.contains_key(&sip.patient_id) {
            return Err(DatabaseError::not_found("patient", &sip.patient_id));
        }
        if tables.sips.contains_key(&sip.patient_id) {
            return Err(conflict(format!(
                "patient '{}' already has a SIP",
                sip.patient_id
            )));
        }
        if tables.sips.values().any(|s| s.sip_number == sip.sip_number) {
            return Err(conflict(format!("SIP {} already issued", sip.sip_number)));
        }
        tables.sips.insert(sip.patient_id.clone(), sip.clone());
        Ok(sip)
    }

    async fn get_sip(&self, patient_id: &str) -> DatabaseResult<Option<Sip>> {
        Ok(self.tables.read().sips.get(patient_id).cloned())
    }

    async fn delete_sip(&self, patient_id: &str) -> DatabaseResult<()> {
        self.tables
            .write()
            .sips
            .remove(patient_id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::not_found("sip", patient_id))
    }

    async fn insert_medication(&self, medication: Medication) -> DatabaseResult<Medication> {
        let mut tables = self.tables.write();
        if tables.medications.contains_key(&medication.id) {
            return Err(conflict(format!("medication '{}' already exists", medication.id)));
        }
        tables
            .medications
            .insert(medication.id.clone(), medication.clone());
        Ok(medication)
    }

    async fn list_medications(&self) -> DatabaseResult<Vec<Medication>> {
        Ok(self.tables.read().medications.values().cloned().collect())
    }

    async fn find_credential(
        &self,
        role: Role,
        username: &str,
    ) -> DatabaseResult<Option<CredentialRecord>> {
        let tables = self.tables.read();
        let record = match role {
            Role::Patient => tables
                .patients
                .values()
                .find(|p| p.username == username)
                .map(|p| CredentialRecord {
                    identifier: p.id.clone(),
                    username: p.username.clone(),
                    password_hash: p.password_hash.clone(),
                }),
            Role::Doctor | Role::Nurse => {
                let kind = if role == Role::Doctor {
                    StaffKind::Doctor
                } else {
                    StaffKind::Nurse
                };
                tables
                    .staff(kind)
                    .values()
                    .find(|m| m.username == username)
                    .map(|m| CredentialRecord {
                        identifier: m.id.clone(),
                        username: m.username.clone(),
                        password_hash: m.password_hash.clone(),
                    })
            }
        };
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Condition;

    fn patient(id: &str, username: &str) -> Patient {
        Patient {
            id: id.into(),
            username: username.into(),
            password_hash: "$argon2id$stub".into(),
            first_name: "Ana".into(),
            last_name: "Ruiz".into(),
            age: 34,
            gender: "F".into(),
            condition: Condition::Mild,
            medical_history: vec![],
            symptoms: vec!["fever".into()],
            allergies: vec![],
            doctor_id: None,
            nurse_id: None,
            room_number: None,
        }
    }

    fn staff(id: &str, username: &str) -> StaffMember {
        StaffMember {
            id: id.into(),
            username: username.into(),
            password_hash: "$argon2id$stub".into(),
            specialty: "general".into(),
            seniority_years: 3,
        }
    }

    #[tokio::test]
    async fn usernames_unique_per_store_only() {
        let store = InMemoryRecordStore::new();
        store.insert_patient(patient("p1", "ana")).await.unwrap();
        assert!(matches!(
            store.insert_patient(patient("p2", "ana")).await,
            Err(DatabaseError::Conflict(_))
        ));
        // same username in another store is fine
        store
            .insert_staff(StaffKind::Doctor, staff("d1", "ana"))
            .await
            .unwrap();

        let as_patient = store.find_credential(Role::Patient, "ana").await.unwrap().unwrap();
        let as_doctor = store.find_credential(Role::Doctor, "ana").await.unwrap().unwrap();
        assert_eq!(as_patient.identifier, "p1");
        assert_eq!(as_doctor.identifier, "d1");
        assert!(store.find_credential(Role::Nurse, "ana").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn room_assignment_rules() {
        let store = InMemoryRecordStore::new();
        store.insert_patient(patient("p1", "ana")).await.unwrap();
        store.insert_patient(patient("p2", "ben")).await.unwrap();
        store
            .insert_room(Room {
                number: 101,
                capacity: 1,
                clean: false,
            })
            .await
            .unwrap();

        assert!(matches!(
            store.assign_room("p1", 101).await,
            Err(DatabaseError::Conflict(msg)) if msg.contains("not clean")
        ));
        store.clean_room(101).await.unwrap();
        assert_eq!(store.assign_room("p1", 101).await.unwrap().room_number, Some(101));
        // re-assigning the same patient does not count twice
        store.assign_room("p1", 101).await.unwrap();
        assert!(matches!(
            store.assign_room("p2", 101).await,
            Err(DatabaseError::Conflict(msg)) if msg.contains("full")
        ));
        assert!(matches!(
            store.assign_room("p2", 999).await,
            Err(DatabaseError::NotFound { entity: "room", .. })
        ));

        store.delete_room(101).await.unwrap();
        assert_eq!(store.get_patient("p1").await.unwrap().unwrap().room_number, None);
    }

    #[tokio::test]
    async fn one_sip_per_patient() {
        let store = InMemoryRecordStore::new();
        store.insert_patient(patient("p1", "ana")).await.unwrap();
        let sip = Sip {
            sip_number: Sip::generate_number(),
            patient_id: "p1".into(),
        };
        store.create_sip(sip.clone()).await.unwrap();
        assert!(matches!(
            store
                .create_sip(Sip {
                    sip_number: Sip::generate_number(),
                    patient_id: "p1".into(),
                })
                .await,
            Err(DatabaseError::Conflict(_))
        ));
        assert_eq!(store.get_sip("p1").await.unwrap(), Some(sip));

        store.delete_patient("p1").await.unwrap();
        assert_eq!(store.get_sip("p1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn one_aide_per_nurse() {
        let store = InMemoryRecordStore::new();
        store
            .insert_staff(StaffKind::Nurse, staff("n1", "joy"))
            .await
            .unwrap();
        let aide = |id: &str| Aide {
            id: id.into(),
            seniority_years: 1,
            nurse_id: Some("n1".into()),
        };
        store.insert_aide(aide("a1")).await.unwrap();
        assert!(matches!(
            store.insert_aide(aide("a2")).await,
            Err(DatabaseError::Conflict(_))
        ));

        store.delete_staff(StaffKind::Nurse, "n1").await.unwrap();
        assert_eq!(store.list_aides().await.unwrap()[0].nurse_id, None);
    }

    #[tokio::test]
    async fn assign_doctor_requires_both() {
        let store = InMemoryRecordStore::new();
        store.insert_patient(patient("p1", "ana")).await.unwrap();
        assert!(matches!(
            store.assign_doctor("p1", "d1").await,
            Err(DatabaseError::NotFound { entity: "doctor", .. })
        ));
        store
            .insert_staff(StaffKind::Doctor, staff("d1", "house"))
            .await
            .unwrap();
        let updated = store.assign_doctor("p1", "d1").await.unwrap();
        assert_eq!(updated.doctor_id.as_deref(), Some("d1"));

        store.delete_staff(StaffKind::Doctor, "d1").await.unwrap();
        assert_eq!(store.get_patient("p1").await.unwrap().unwrap().doctor_id, None);
    }
}
