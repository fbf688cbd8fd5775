use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use database_layer::{Aide, StaffKind, StaffMember};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::middleware::{roles, ApiJson, AuthContext};
use crate::server::HospitalServer;
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};

/// Register doctor or nurse. No `Debug`: carries a password.
#[derive(Deserialize, ToSchema)]
pub struct CreateStaffRequest {
    pub id: Option<String>,
    pub username: String,
    pub password: String,
    pub specialty: String,
    #[serde(default)]
    pub seniority_years: i32,
}

impl RequestValidation for CreateStaffRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.username, "username");
        validate_required!(self.password, "password");
        validate_required!(self.specialty, "specialty");
        validate_field!(
            "seniority_years",
            self.seniority_years >= 0,
            "seniority_years cannot be negative"
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAideRequest {
    pub id: Option<String>,
    #[serde(default)]
    pub seniority_years: i32,
    /// Nurse this aide supports; a nurse has at most one aide
    pub nurse_id: Option<String>,
}

impl RequestValidation for CreateAideRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_field!(
            "seniority_years",
            self.seniority_years >= 0,
            "seniority_years cannot be negative"
        );
        Ok(())
    }
}

async fn list_members(
    server: &HospitalServer,
    auth: &AuthContext,
    kind: StaffKind,
) -> Result<Json<Vec<StaffMember>>, ApiError> {
    auth.require_any(roles::STAFF)?;
    Ok(Json(server.records.list_staff(kind).await?))
}

async fn register_member(
    server: &HospitalServer,
    auth: &AuthContext,
    kind: StaffKind,
    request: CreateStaffRequest,
) -> Result<(StatusCode, Json<StaffMember>), ApiError> {
    auth.require_any(roles::DOCTOR)?;
    request.validate()?;

    let password_hash = server.hash_password(&request.password).await?;
    let member = StaffMember {
        id: server.id_or_generate(request.id),
        username: request.username.trim().to_string(),
        password_hash,
        specialty: request.specialty,
        seniority_years: request.seniority_years,
    };
    let created = server.records.insert_staff(kind, member).await?;
    info!(
        staff_id = %created.id,
        kind = kind.entity(),
        registered_by = %auth.identifier(),
        "Staff member registered"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

async fn remove_member(
    server: &HospitalServer,
    auth: &AuthContext,
    kind: StaffKind,
    id: &str,
) -> Result<StatusCode, ApiError> {
    auth.require_any(roles::DOCTOR)?;
    server.records.delete_staff(kind, id).await?;
    info!(staff_id = %id, kind = kind.entity(), "Staff member removed");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/v1/doctors",
    responses(
        (status = 200, description = "All doctors", body = Vec<StaffMember>),
        (status = 403, description = "Staff only", body = crate::error::ApiErrorResponse)
    ),
    tag = "staff",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn list_doctors(
    State(server): State<HospitalServer>,
    auth: AuthContext,
) -> Result<Json<Vec<StaffMember>>, ApiError> {
    list_members(&server, &auth, StaffKind::Doctor).await
}

#[utoipa::path(
    post,
    path = "/api/v1/doctors",
    request_body = CreateStaffRequest,
    responses(
        (status = 201, description = "Doctor registered", body = StaffMember),
        (status = 400, description = "Invalid request", body = crate::error::ApiErrorResponse),
        (status = 409, description = "Username already taken", body = crate::error::ApiErrorResponse)
    ),
    tag = "staff",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn create_doctor(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    ApiJson(request): ApiJson<CreateStaffRequest>,
) -> Result<(StatusCode, Json<StaffMember>), ApiError> {
    register_member(&server, &auth, StaffKind::Doctor, request).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/doctors/{id}",
    params(("id" = String, Path, description = "Doctor id")),
    responses(
        (status = 204, description = "Doctor removed; their patients are unassigned"),
        (status = 404, description = "No such doctor", body = crate::error::ApiErrorResponse)
    ),
    tag = "staff",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn delete_doctor(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove_member(&server, &auth, StaffKind::Doctor, &id).await
}

#[utoipa::path(
    get,
    path = "/api/v1/nurses",
    responses(
        (status = 200, description = "All nurses", body = Vec<StaffMember>),
        (status = 403, description = "Staff only", body = crate::error::ApiErrorResponse)
    ),
    tag = "staff",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn list_nurses(
    State(server): State<HospitalServer>,
    auth: AuthContext,
) -> Result<Json<Vec<StaffMember>>, ApiError> {
    list_members(&server, &auth, StaffKind::Nurse).await
}

#[utoipa::path(
    post,
    path = "/api/v1/nurses",
    request_body = CreateStaffRequest,
    responses(
        (status = 201, description = "Nurse registered", body = StaffMember),
        (status = 400, description = "Invalid request", body = crate::error::ApiErrorResponse),
        (status = 409, description = "Username already taken", body = crate::error::ApiErrorResponse)
    ),
    tag = "staff",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn create_nurse(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    ApiJson(request): ApiJson<CreateStaffRequest>,
) -> Result<(StatusCode, Json<StaffMember>), ApiError> {
    register_member(&server, &auth, StaffKind::Nurse, request).await
}

#[utoipa::path(
    delete,
    path = "/api/v1/nurses/{id}",
    params(("id" = String, Path, description = "Nurse id")),
    responses(
        (status = 204, description = "Nurse removed; patients and aides are unlinked"),
        (status = 404, description = "No such nurse", body = crate::error::ApiErrorResponse)
    ),
    tag = "staff",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn delete_nurse(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    remove_member(&server, &auth, StaffKind::Nurse, &id).await
}

#[utoipa::path(
    get,
    path = "/api/v1/aides",
    responses(
        (status = 200, description = "All aides", body = Vec<Aide>)
    ),
    tag = "staff",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn list_aides(
    State(server): State<HospitalServer>,
    auth: AuthContext,
) -> Result<Json<Vec<Aide>>, ApiError> {
    auth.require_any(roles::STAFF)?;
    Ok(Json(server.records.list_aides().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/aides",
    request_body = CreateAideRequest,
    responses(
        (status = 201, description = "Aide registered", body = Aide),
        (status = 404, description = "Referenced nurse missing", body = crate::error::ApiErrorResponse),
        (status = 409, description = "Nurse already has an aide", body = crate::error::ApiErrorResponse)
    ),
    tag = "staff",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn create_aide(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    ApiJson(request): ApiJson<CreateAideRequest>,
) -> Result<(StatusCode, Json<Aide>), ApiError> {
    auth.require_any(roles::STAFF)?;
    request.validate()?;

    let aide = Aide {
        id: server.id_or_generate(request.id),
        seniority_years: request.seniority_years,
        nurse_id: request
            .nurse_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty()),
    };
    let created = server.records.insert_aide(aide).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/aides/{id}",
    params(("id" = String, Path, description = "Aide id")),
    responses(
        (status = 204, description = "Aide removed"),
        (status = 404, description = "No such aide", body = crate::error::ApiErrorResponse)
    ),
    tag = "staff",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn delete_aide(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    auth.require_any(roles::DOCTOR)?;
    server.records.delete_aide(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
