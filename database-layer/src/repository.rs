use async_trait::async_trait;
use auth_identity::{CredentialRecord, Role};

use crate::error::DatabaseResult;
use crate::models::{Aide, Medication, Patient, Room, Sip, StaffKind, StaffMember};

/// Everything the hospital API reads and writes.
///
/// Inserts fail with `Conflict` on a duplicate id or a username already
/// taken in the same identity store. Deletes and assignments fail with
/// `NotFound` when a referenced record is missing.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert_patient(&self, patient: Patient) -> DatabaseResult<Patient>;
    async fn list_patients(&self) -> DatabaseResult<Vec<Patient>>;
    async fn get_patient(&self, id: &str) -> DatabaseResult<Option<Patient>>;
    /// Also drops the patient's SIP.
    async fn delete_patient(&self, id: &str) -> DatabaseResult<()>;

    async fn insert_staff(&self, kind: StaffKind, member: StaffMember) -> DatabaseResult<StaffMember>;
    async fn list_staff(&self, kind: StaffKind) -> DatabaseResult<Vec<StaffMember>>;
    async fn get_staff(&self, kind: StaffKind, id: &str) -> DatabaseResult<Option<StaffMember>>;
    /// Patients and aides pointing at the member are unlinked.
    async fn delete_staff(&self, kind: StaffKind, id: &str) -> DatabaseResult<()>;

    async fn insert_aide(&self, aide: Aide) -> DatabaseResult<Aide>;
    async fn list_aides(&self) -> DatabaseResult<Vec<Aide>>;
    async fn delete_aide(&self, id: &str) -> DatabaseResult<()>;

    async fn insert_room(&self, room: Room) -> DatabaseResult<Room>;
    async fn list_rooms(&self) -> DatabaseResult<Vec<Room>>;
    async fn clean_room(&self, number: i32) -> DatabaseResult<Room>;
    /// Occupants are moved out of the room.
    async fn delete_room(&self, number: i32) -> DatabaseResult<()>;

    async fn assign_doctor(&self, patient_id: &str, doctor_id: &str) -> DatabaseResult<Patient>;
    /// Requires the room to exist, be clean and have a free bed.
    async fn assign_room(&self, patient_id: &str, room_number: i32) -> DatabaseResult<Patient>;

    /// `Conflict` when the patient already has one.
    async fn create_sip(&self, sip: Sip) -> DatabaseResult<Sip>;
    async fn get_sip(&self, patient_id: &str) -> DatabaseResult<Option<Sip>>;
    async fn delete_sip(&self, patient_id: &str) -> DatabaseResult<()>;

    async fn insert_medication(&self, medication: Medication) -> DatabaseResult<Medication>;
    async fn list_medications(&self) -> DatabaseResult<Vec<Medication>>;

    /// Exact-username lookup in the identity store for `role`.
    async fn find_credential(
        &self,
        role: Role,
        username: &str,
    ) -> DatabaseResult<Option<CredentialRecord>>;
}
