use async_trait::async_trait;
use auth_identity::{CredentialRecord, Role};
use sqlx::{postgres::PgRow, PgPool, Row};
use tracing::{debug, info};

use crate::error::{DatabaseError, DatabaseResult};
use crate::models::{Aide, Condition, Medication, Patient, Room, Sip, StaffKind, StaffMember};
use crate::repository::RecordStore;

const SCHEMA: &[&str] = &[
    r"CREATE TABLE IF NOT EXISTS doctors (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        specialty TEXT NOT NULL,
        seniority_years INTEGER NOT NULL
    )",
    r"CREATE TABLE IF NOT EXISTS nurses (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        specialty TEXT NOT NULL,
        seniority_years INTEGER NOT NULL
    )",
    r"CREATE TABLE IF NOT EXISTS rooms (
        number INTEGER PRIMARY KEY,
        capacity INTEGER NOT NULL CHECK (capacity > 0),
        clean BOOLEAN NOT NULL DEFAULT FALSE
    )",
    r"CREATE TABLE IF NOT EXISTS patients (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        age INTEGER NOT NULL,
        gender TEXT NOT NULL,
        condition TEXT NOT NULL,
        medical_history TEXT[] NOT NULL DEFAULT '{}',
        symptoms TEXT[] NOT NULL DEFAULT '{}',
        allergies TEXT[] NOT NULL DEFAULT '{}',
        doctor_id TEXT REFERENCES doctors(id) ON DELETE SET NULL,
        nurse_id TEXT REFERENCES nurses(id) ON DELETE SET NULL,
        room_number INTEGER REFERENCES rooms(number) ON DELETE SET NULL
    )",
    r"CREATE TABLE IF NOT EXISTS aides (
        id TEXT PRIMARY KEY,
        seniority_years INTEGER NOT NULL,
        nurse_id TEXT UNIQUE REFERENCES nurses(id) ON DELETE SET NULL
    )",
    r"CREATE TABLE IF NOT EXISTS sips (
        sip_number TEXT PRIMARY KEY,
        patient_id TEXT NOT NULL UNIQUE REFERENCES patients(id) ON DELETE CASCADE
    )",
    r"CREATE TABLE IF NOT EXISTS medications (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        dose TEXT NOT NULL,
        price DOUBLE PRECISION NOT NULL,
        expires_on DATE NOT NULL,
        allergens TEXT[] NOT NULL DEFAULT '{}',
        treats TEXT[] NOT NULL DEFAULT '{}'
    )",
];

const PATIENT_COLUMNS: &str = "id, username, password_hash, first_name, last_name, age, gender, \
     condition, medical_history, symptoms, allergies, doctor_id, nurse_id, room_number";

/// Record store backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create any missing table. Safe to run on every start.
    ///
    /// # Errors
    ///
    /// Propagates the first failing statement.
    pub async fn ensure_schema(&self) -> DatabaseResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!(tables = SCHEMA.len(), "Database schema ensured");
        Ok(())
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn patient_from_row(row: &PgRow) -> DatabaseResult<Patient> {
    let condition: String = row.try_get("condition")?;
    Ok(Patient {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        age: row.try_get("age")?,
        gender: row.try_get("gender")?,
        condition: condition
            .parse::<Condition>()
            .map_err(DatabaseError::QueryFailed)?,
        medical_history: row.try_get("medical_history")?,
        symptoms: row.try_get("symptoms")?,
        allergies: row.try_get("allergies")?,
        doctor_id: row.try_get("doctor_id")?,
        nurse_id: row.try_get("nurse_id")?,
        room_number: row.try_get("room_number")?,
    })
}

fn staff_from_row(row: &PgRow) -> DatabaseResult<StaffMember> {
    Ok(StaffMember {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        password_hash: row.try_get("password_hash")?,
        specialty: row.try_get("specialty")?,
        seniority_years: row.try_get("seniority_years")?,
    })
}

fn aide_from_row(row: &PgRow) -> DatabaseResult<Aide> {
    Ok(Aide {
        id: row.try_get("id")?,
        seniority_years: row.try_get("seniority_years")?,
        nurse_id: row.try_get("nurse_id")?,
    })
}

fn room_from_row(row: &PgRow) -> DatabaseResult<Room> {
    Ok(Room {
        number: row.try_get("number")?,
        capacity: row.try_get("capacity")?,
        clean: row.try_get("clean")?,
    })
}

fn sip_from_row(row: &PgRow) -> DatabaseResult<Sip> {
    Ok(Sip {
        sip_number: row.try_get("sip_number")?,
        patient_id: row.try_get("patient_id")?,
    })
}

fn medication_from_row(row: &PgRow) -> DatabaseResult<Medication> {
    Ok(Medication {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        dose: row.try_get("dose")?,
        price: row.try_get("price")?,
        expires_on: row.try_get("expires_on")?,
        allergens: row.try_get("allergens")?,
        treats: row.try_get("treats")?,
    })
}

fn require_affected(rows: u64, entity: &'static str, id: impl ToString) -> DatabaseResult<()> {
    if rows == 0 {
        Err(DatabaseError::not_found(entity, id))
    } else {
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn insert_patient(&self, patient: Patient) -> DatabaseResult<Patient> {
        let query = format!(
            "INSERT INTO patients ({PATIENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
             RETURNING {PATIENT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(&patient.id)
            .bind(&patient.username)
            .bind(&patient.password_hash)
            .bind(&patient.first_name)
            .bind(&patient.last_name)
            .bind(patient.age)
            .bind(&patient.gender)
            .bind(patient.condition.as_str())
            .bind(&patient.medical_history)
            .bind(&patient.symptoms)
            .bind(&patient.allergies)
            .bind(&patient.doctor_id)
            .bind(&patient.nurse_id)
            .bind(patient.room_number)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::from_insert(e, || {
                    format!("patient '{}' or username '{}' already exists", patient.id, patient.username)
                })
            })?;
        patient_from_row(&row)
    }

    async fn list_patients(&self) -> DatabaseResult<Vec<Patient>> {
        let rows = sqlx::query(&format!("SELECT {PATIENT_COLUMNS} FROM patients ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(patient_from_row).collect()
    }

    async fn get_patient(&self, id: &str) -> DatabaseResult<Option<Patient>> {
        let row = sqlx::query(&format!("SELECT {PATIENT_COLUMNS} FROM patients WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(patient_from_row).transpose()
    }

    async fn delete_patient(&self, id: &str) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM patients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        require_affected(result.rows_affected(), "patient", id)
    }

    async fn insert_staff(&self, kind: StaffKind, member: StaffMember) -> DatabaseResult<StaffMember> {
        let query = format!(
            "INSERT INTO {} (id, username, password_hash, specialty, seniority_years) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, username, password_hash, specialty, seniority_years",
            kind.table()
        );
        let row = sqlx::query(&query)
            .bind(&member.id)
            .bind(&member.username)
            .bind(&member.password_hash)
            .bind(&member.specialty)
            .bind(member.seniority_years)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DatabaseError::from_insert(e, || {
                    format!(
                        "{} '{}' or username '{}' already exists",
                        kind.entity(),
                        member.id,
                        member.username
                    )
                })
            })?;
        staff_from_row(&row)
    }

    async fn list_staff(&self, kind: StaffKind) -> DatabaseResult<Vec<StaffMember>> {
        let query = format!(
            "SELECT id, username, password_hash, specialty, seniority_years FROM {} ORDER BY id",
            kind.table()
        );
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        rows.iter().map(staff_from_row).collect()
    }

    async fn get_staff(&self, kind: StaffKind, id: &str) -> DatabaseResult<Option<StaffMember>> {
        let query = format!(
            "SELECT id, username, password_hash, specialty, seniority_years FROM {} WHERE id = $1",
            kind.table()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(staff_from_row).transpose()
    }

    async fn delete_staff(&self, kind: StaffKind, id: &str) -> DatabaseResult<()> {
        let query = format!("DELETE FROM {} WHERE id = $1", kind.table());
        let result = sqlx::query(&query).bind(id).execute(&self.pool).await?;
        require_affected(result.rows_affected(), kind.entity(), id)
    }

    async fn insert_aide(&self, aide: Aide) -> DatabaseResult<Aide> {
        if let Some(nurse_id) = &aide.nurse_id {
            if self.get_staff(StaffKind::Nurse, nurse_id).await?.is_none() {
                return Err(DatabaseError::not_found("nurse", nurse_id));
            }
        }
        let row = sqlx::query(
            "INSERT INTO aides (id, seniority_years, nurse_id) VALUES ($1, $2, $3) \
             RETURNING id, seniority_years, nurse_id",
        )
        .bind(&aide.id)
        .bind(aide.seniority_years)
        .bind(&aide.nurse_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::from_insert(e, || {
                format!("aide '{}' already exists or nurse already has an aide", aide.id)
            })
        })?;
        aide_from_row(&row)
    }

    async fn list_aides(&self) -> DatabaseResult<Vec<Aide>> {
        let rows = sqlx::query("SELECT id, seniority_years, nurse_id FROM aides ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(aide_from_row).collect()
    }

    async fn delete_aide(&self, id: &str) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM aides WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        require_affected(result.rows_affected(), "aide", id)
    }

    async fn insert_room(&self, room: Room) -> DatabaseResult<Room> {
        let row = sqlx::query(
            "INSERT INTO rooms (number, capacity, clean) VALUES ($1, $2, $3) \
             RETURNING number, capacity, clean",
        )
        .bind(room.number)
        .bind(room.capacity)
        .bind(room.clean)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DatabaseError::from_insert(e, || format!("room {} already exists", room.number)))?;
        room_from_row(&row)
    }

    async fn list_rooms(&self) -> DatabaseResult<Vec<Room>> {
        let rows = sqlx::query("SELECT number, capacity, clean FROM rooms ORDER BY number")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(room_from_row).collect()
    }

    async fn clean_room(&self, number: i32) -> DatabaseResult<Room> {
        let row = sqlx::query(
            "UPDATE rooms SET clean = TRUE WHERE number = $1 RETURNING number, capacity, clean",
        )
        .bind(number)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("room", number))?;
        room_from_row(&row)
    }

    async fn delete_room(&self, number: i32) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM rooms WHERE number = $1")
            .bind(number)
            .execute(&self.pool)
            .await?;
        require_affected(result.rows_affected(), "room", number)
    }

    async fn assign_doctor(&self, patient_id: &str, doctor_id: &str) -> DatabaseResult<Patient> {
        if self.get_staff(StaffKind::Doctor, doctor_id).await?.is_none() {
            return Err(DatabaseError::not_found("doctor", doctor_id));
        }
        let row = sqlx::query(&format!(
            "UPDATE patients SET doctor_id = $2 WHERE id = $1 RETURNING {PATIENT_COLUMNS}"
        ))
        .bind(patient_id)
        .bind(doctor_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DatabaseError::not_found("patient", patient_id))?;
        patient_from_row(&row)
    }

    async fn assign_room(&self, patient_id: &str, room_number: i32) -> DatabaseResult<Patient> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT id FROM patients WHERE id = $1 FOR UPDATE")
            .bind(patient_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DatabaseError::not_found("patient", patient_id))?;

        let room_row =
            sqlx::query("SELECT number, capacity, clean FROM rooms WHERE number = $1 FOR UPDATE")
                .bind(room_number)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DatabaseError::not_found("room", room_number))?;
        let room = room_from_row(&room_row)?;
        if !room.clean {
            return Err(DatabaseError::Conflict(format!("room {room_number} is not clean")));
        }

        let occupied: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM patients WHERE room_number = $1 AND id <> $2",
        )
        .bind(room_number)
        .bind(patient_id)
        .fetch_one(&mut *tx)
        .await?;
        if occupied >= i64::from(room.capacity) {
            return Err(DatabaseError::Conflict(format!("room {room_number} is full")));
        }

        let row = sqlx::query(&format!(
            "UPDATE patients SET room_number = $2 WHERE id = $1 RETURNING {PATIENT_COLUMNS}"
        ))
        .bind(patient_id)
        .bind(room_number)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;

        debug!(room_number, occupied, "Patient assigned to room");
        patient_from_row(&row)
    }

    async fn create_sip(&self, sip: Sip) -> DatabaseResult<Sip> {
        if self.get_patient(&sip.patient_id).await?.is_none() {
            return Err(DatabaseError::not_found("patient", &sip.patient_id));
        }
        let row = sqlx::query(
            "INSERT INTO sips (sip_number, patient_id) VALUES ($1, $2) \
             RETURNING sip_number, patient_id",
        )
        .bind(&sip.sip_number)
        .bind(&sip.patient_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::from_insert(e, || {
                format!("patient '{}' already has a SIP", sip.patient_id)
            })
        })?;
        sip_from_row(&row)
    }

    async fn get_sip(&self, patient_id: &str) -> DatabaseResult<Option<Sip>> {
        let row = sqlx::query("SELECT sip_number, patient_id FROM sips WHERE patient_id = $1")
            .bind(patient_id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(sip_from_row).transpose()
    }

    async fn delete_sip(&self, patient_id: &str) -> DatabaseResult<()> {
        let result = sqlx::query("DELETE FROM sips WHERE patient_id = $1")
            .bind(patient_id)
            .execute(&self.pool)
            .await?;
        require_affected(result.rows_affected(), "sip", patient_id)
    }

    async fn insert_medication(&self, medication: Medication) -> DatabaseResult<Medication> {
        let row = sqlx::query(
            "INSERT INTO medications (id, name, dose, price, expires_on, allergens, treats) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING id, name, dose, price, expires_on, allergens, treats",
        )
        .bind(&medication.id)
        .bind(&medication.name)
        .bind(&medication.dose)
        .bind(medication.price)
        .bind(medication.expires_on)
        .bind(&medication.allergens)
        .bind(&medication.treats)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DatabaseError::from_insert(e, || format!("medication '{}' already exists", medication.id))
        })?;
        medication_from_row(&row)
    }

    async fn list_medications(&self) -> DatabaseResult<Vec<Medication>> {
        let rows = sqlx::query(
            "SELECT id, name, dose, price, expires_on, allergens, treats FROM medications ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(medication_from_row).collect()
    }

    async fn find_credential(
        &self,
        role: Role,
        username: &str,
    ) -> DatabaseResult<Option<CredentialRecord>> {
        let table = match role {
            Role::Patient => "patients",
            Role::Doctor => StaffKind::Doctor.table(),
            Role::Nurse => StaffKind::Nurse.table(),
        };
        let row = sqlx::query(&format!(
            "SELECT id, username, password_hash FROM {table} WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> DatabaseResult<CredentialRecord> {
            Ok(CredentialRecord {
                identifier: row.try_get("id")?,
                username: row.try_get("username")?,
                password_hash: row.try_get("password_hash")?,
            })
        })
        .transpose()
    }
}
