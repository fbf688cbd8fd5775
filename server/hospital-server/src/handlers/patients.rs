use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use database_layer::{Condition, Patient, Sip};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::middleware::{roles, ApiJson, AuthContext};
use crate::server::HospitalServer;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// Register patient request. No `Debug`: carries a password.
#[derive(Deserialize, ToSchema)]
pub struct CreatePatientRequest {
    /// Generated when absent
    pub id: Option<String>,
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    #[serde(default)]
    pub gender: String,
    /// `grave`, `moderate` or `mild`
    pub condition: String,
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub nurse_id: Option<String>,
}

impl RequestValidation for CreatePatientRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.username, "username");
        validate_required!(self.password, "password");
        validate_required!(self.first_name, "first_name");
        validate_required!(self.last_name, "last_name");
        validate_field!(
            "age",
            (0..=150).contains(&self.age),
            "age must be between 0 and 150"
        );
        validate_field!(
            "condition",
            self.condition.parse::<Condition>().is_ok(),
            "condition must be one of grave, moderate, mild"
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignDoctorRequest {
    pub doctor_id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssignRoomRequest {
    pub room_number: i32,
}

// ============================================================================
// HANDLERS
// ============================================================================

#[utoipa::path(
    get,
    path = "/api/v1/patients",
    responses(
        (status = 200, description = "All patients", body = Vec<Patient>),
        (status = 401, description = "Unauthorized", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Staff only", body = crate::error::ApiErrorResponse)
    ),
    tag = "patients",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn list_patients(
    State(server): State<HospitalServer>,
    auth: AuthContext,
) -> Result<Json<Vec<Patient>>, ApiError> {
    auth.require_any(roles::STAFF)?;
    Ok(Json(server.records.list_patients().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = CreatePatientRequest,
    responses(
        (status = 201, description = "Patient registered", body = Patient),
        (status = 400, description = "Invalid request", body = crate::error::ApiErrorResponse),
        (status = 409, description = "Username or id already taken", body = crate::error::ApiErrorResponse)
    ),
    tag = "patients",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn create_patient(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    ApiJson(request): ApiJson<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Patient>), ApiError> {
    auth.require_any(roles::STAFF)?;
    request.validate()?;

    let condition = request
        .condition
        .parse::<Condition>()
        .map_err(|message| ApiError::invalid_field("condition", message))?;
    let password_hash = server.hash_password(&request.password).await?;

    let patient = Patient {
        id: server.id_or_generate(request.id),
        username: request.username.trim().to_string(),
        password_hash,
        first_name: request.first_name,
        last_name: request.last_name,
        age: request.age,
        gender: request.gender,
        condition,
        medical_history: request.medical_history,
        symptoms: request.symptoms,
        allergies: request.allergies,
        doctor_id: None,
        nurse_id: request.nurse_id,
        room_number: None,
    };
    let created = server.records.insert_patient(patient).await?;
    info!(patient_id = %created.id, registered_by = %auth.identifier(), "Patient registered");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/me",
    responses(
        (status = 200, description = "The caller's own record", body = Patient),
        (status = 403, description = "Patients only", body = crate::error::ApiErrorResponse)
    ),
    tag = "patients",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn my_record(
    State(server): State<HospitalServer>,
    auth: AuthContext,
) -> Result<Json<Patient>, ApiError> {
    auth.require_any(roles::PATIENT)?;
    let patient = server
        .records
        .get_patient(auth.identifier())
        .await?
        .ok_or_else(|| ApiError::not_found("Patient record not found"))?;
    Ok(Json(patient))
}

#[utoipa::path(
    delete,
    path = "/api/v1/patients/{id}",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 204, description = "Patient removed along with their SIP"),
        (status = 404, description = "No such patient", body = crate::error::ApiErrorResponse)
    ),
    tag = "patients",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn delete_patient(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(patient_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require_any(roles::DOCTOR)?;
    server.records.delete_patient(&patient_id).await?;
    info!(patient_id = %patient_id, "Patient removed");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/doctor",
    params(("id" = String, Path, description = "Patient id")),
    request_body = AssignDoctorRequest,
    responses(
        (status = 200, description = "Doctor assigned", body = Patient),
        (status = 404, description = "Patient or doctor missing", body = crate::error::ApiErrorResponse)
    ),
    tag = "patients",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn assign_doctor(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(patient_id): Path<String>,
    ApiJson(request): ApiJson<AssignDoctorRequest>,
) -> Result<Json<Patient>, ApiError> {
    auth.require_any(roles::DOCTOR)?;
    validate_required!(request.doctor_id, "doctor_id");
    let patient = server
        .records
        .assign_doctor(&patient_id, request.doctor_id.trim())
        .await?;
    Ok(Json(patient))
}

#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/room",
    params(("id" = String, Path, description = "Patient id")),
    request_body = AssignRoomRequest,
    responses(
        (status = 200, description = "Patient moved into the room", body = Patient),
        (status = 404, description = "Patient or room missing", body = crate::error::ApiErrorResponse),
        (status = 409, description = "Room not clean or full", body = crate::error::ApiErrorResponse)
    ),
    tag = "patients",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn assign_room(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(patient_id): Path<String>,
    ApiJson(request): ApiJson<AssignRoomRequest>,
) -> Result<Json<Patient>, ApiError> {
    auth.require_any(roles::STAFF)?;
    let patient = server
        .records
        .assign_room(&patient_id, request.room_number)
        .await?;
    info!(patient_id = %patient_id, room = request.room_number, "Patient assigned to room");
    Ok(Json(patient))
}

#[utoipa::path(
    post,
    path = "/api/v1/patients/{id}/sip",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 201, description = "SIP number issued", body = Sip),
        (status = 404, description = "No such patient", body = crate::error::ApiErrorResponse),
        (status = 409, description = "Patient already has a SIP", body = crate::error::ApiErrorResponse)
    ),
    tag = "patients",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn create_sip(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(patient_id): Path<String>,
) -> Result<(StatusCode, Json<Sip>), ApiError> {
    auth.require_any(roles::STAFF)?;
    let sip = server
        .records
        .create_sip(Sip {
            sip_number: Sip::generate_number(),
            patient_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(sip)))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/sip",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "The patient's SIP", body = Sip),
        (status = 404, description = "No SIP for this patient", body = crate::error::ApiErrorResponse)
    ),
    tag = "patients",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn get_sip(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(patient_id): Path<String>,
) -> Result<Json<Sip>, ApiError> {
    auth.require_any(roles::STAFF)?;
    server
        .records
        .get_sip(&patient_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("No SIP for patient '{patient_id}'")))
}

#[utoipa::path(
    delete,
    path = "/api/v1/patients/{id}/sip",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 204, description = "SIP removed"),
        (status = 404, description = "No SIP for this patient", body = crate::error::ApiErrorResponse)
    ),
    tag = "patients",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn delete_sip(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(patient_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require_any(roles::DOCTOR)?;
    server.records.delete_sip(&patient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
