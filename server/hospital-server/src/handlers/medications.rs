use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::NaiveDate;
use database_layer::Medication;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use utoipa::{IntoParams, ToSchema};

use crate::error::ApiError;
use crate::middleware::{roles, ApiJson, AuthContext};
use crate::server::HospitalServer;
use crate::services::{allergen_report, AllergenCheck, CatalogError, MedicationCatalog};
use crate::validation::RequestValidation;
use crate::{validate_field, validate_required};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMedicationRequest {
    pub id: Option<String>,
    pub name: String,
    pub dose: String,
    pub price: f64,
    #[schema(value_type = String, format = Date)]
    pub expires_on: NaiveDate,
    #[serde(default)]
    pub allergens: Vec<String>,
    /// Symptoms this medication relieves
    #[serde(default)]
    pub treats: Vec<String>,
}

impl RequestValidation for CreateMedicationRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_required!(self.name, "name");
        validate_required!(self.dose, "dose");
        validate_field!(
            "price",
            self.price.is_finite() && self.price >= 0.0,
            "price must be a non-negative number"
        );
        Ok(())
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct DrugInfoQuery {
    /// Drug name to look up
    pub name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecommendationResponse {
    pub patient_id: String,
    pub recommended: Vec<Medication>,
    pub allergen_report: Vec<AllergenCheck>,
}

#[utoipa::path(
    get,
    path = "/api/v1/medications",
    responses(
        (status = 200, description = "Medication catalog", body = Vec<Medication>)
    ),
    tag = "medications",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn list_medications(
    State(server): State<HospitalServer>,
    auth: AuthContext,
) -> Result<Json<Vec<Medication>>, ApiError> {
    auth.require_any(roles::STAFF)?;
    Ok(Json(server.records.list_medications().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/medications",
    request_body = CreateMedicationRequest,
    responses(
        (status = 201, description = "Medication added", body = Medication),
        (status = 400, description = "Invalid request", body = crate::error::ApiErrorResponse)
    ),
    tag = "medications",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn create_medication(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    ApiJson(request): ApiJson<CreateMedicationRequest>,
) -> Result<(StatusCode, Json<Medication>), ApiError> {
    auth.require_any(roles::DOCTOR)?;
    request.validate()?;
    let medication = Medication {
        id: server.id_or_generate(request.id),
        name: request.name.trim().to_string(),
        dose: request.dose,
        price: request.price,
        expires_on: request.expires_on,
        allergens: request.allergens,
        treats: request.treats,
    };
    let created = server.records.insert_medication(medication).await?;
    info!(medication_id = %created.id, "Medication added");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/v1/medications/info",
    params(DrugInfoQuery),
    responses(
        (status = 200, description = "RxNorm drugs.json payload, unmodified"),
        (status = 400, description = "Missing name", body = crate::error::ApiErrorResponse),
        (status = 502, description = "RxNorm unreachable or failing", body = crate::error::ApiErrorResponse)
    ),
    tag = "medications",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn drug_info(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Query(query): Query<DrugInfoQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    auth.require_any(roles::ANY)?;
    let name = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| ApiError::invalid_field("name", "name query parameter is required"))?;

    let payload = server.rxnorm.drugs(name).await.map_err(|e| {
        warn!(error = %e, "Drug information lookup failed");
        ApiError::upstream(e.to_string())
    })?;
    Ok(Json(payload))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{id}/recommendations",
    params(("id" = String, Path, description = "Patient id")),
    responses(
        (status = 200, description = "Medications for the patient's symptoms, allergens excluded", body = RecommendationResponse),
        (status = 400, description = "Patient has no symptoms", body = crate::error::ApiErrorResponse),
        (status = 404, description = "No such patient", body = crate::error::ApiErrorResponse)
    ),
    tag = "medications",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn recommendations(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(patient_id): Path<String>,
) -> Result<Json<RecommendationResponse>, ApiError> {
    auth.require_any(roles::DOCTOR)?;
    let patient = server
        .records
        .get_patient(&patient_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("patient '{patient_id}' not found")))?;

    let catalog = MedicationCatalog::load(server.records.as_ref()).await?;
    let recommended = catalog.recommend(&patient).map_err(|e| match e {
        CatalogError::NoSymptoms(_) => ApiError::invalid_field("symptoms", e.to_string()),
    })?;
    let report = allergen_report(&patient, catalog.medications());

    Ok(Json(RecommendationResponse {
        patient_id: patient.id,
        recommended,
        allergen_report: report,
    }))
}
