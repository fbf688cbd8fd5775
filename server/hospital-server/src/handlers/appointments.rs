use appointment_engine::{AppointmentError, AppointmentSummary, NewAppointment, TransitionOutcome};
use auth_identity::{AuthError, Role};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::middleware::{roles, ApiJson, AuthContext};
use crate::server::HospitalServer;

/// Create appointment request.
///
/// Exactly one of `location`, `contact_phone`, `priority_level` matters: the
/// one required by `kind`. The others are ignored.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAppointmentRequest {
    /// `in_person`, `phone` or `emergency` (legacy spellings accepted)
    pub kind: String,
    /// Defaults to the caller when a patient books for themselves
    pub patient_id: Option<String>,
    pub assigned_staff: Option<String>,
    /// `YYYY-MM-DDTHH:MM:SS`, no timezone
    pub scheduled_at: String,
    pub reason: Option<String>,
    pub location: Option<String>,
    pub contact_phone: Option<String>,
    pub priority_level: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatedAppointment {
    pub appointment_id: String,
}

/// Resolve whose appointment this is. Patients may only book for themselves.
fn booking_patient(auth: &AuthContext, requested: Option<String>) -> Result<String, ApiError> {
    let requested = requested
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());
    match (auth.role(), requested) {
        (Role::Patient, None) => Ok(auth.identifier().to_string()),
        (Role::Patient, Some(id)) if id == auth.identifier() => Ok(id),
        (Role::Patient, Some(_)) => Err(AuthError::Forbidden.into()),
        (_, Some(id)) => Ok(id),
        (_, None) => Err(ApiError::invalid_field("patient_id", "patient_id is required")),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    request_body = CreateAppointmentRequest,
    responses(
        (status = 201, description = "Appointment requested", body = CreatedAppointment),
        (status = 400, description = "Unknown kind, missing variant field, bad timestamp or unknown patient", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Patients may only book for themselves", body = crate::error::ApiErrorResponse)
    ),
    tag = "appointments",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn create_appointment(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    ApiJson(request): ApiJson<CreateAppointmentRequest>,
) -> Result<(StatusCode, Json<CreatedAppointment>), ApiError> {
    auth.require_any(roles::ANY)?;
    let patient_id = booking_patient(&auth, request.patient_id)?;

    let appointment = server
        .appointments
        .create(NewAppointment {
            kind: request.kind,
            patient_id,
            assigned_staff: request.assigned_staff,
            scheduled_at: request.scheduled_at,
            reason: request.reason,
            location: request.location,
            contact_phone: request.contact_phone,
            priority_level: request.priority_level,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedAppointment {
            appointment_id: appointment.appointment_id,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/appointments",
    responses(
        (status = 200, description = "Appointment summaries in creation order"),
        (status = 403, description = "Staff only", body = crate::error::ApiErrorResponse)
    ),
    tag = "appointments",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn list_appointments(
    State(server): State<HospitalServer>,
    auth: AuthContext,
) -> Result<Json<Vec<AppointmentSummary>>, ApiError> {
    auth.require_any(roles::STAFF)?;
    let listing = server.appointments.list();
    Ok(Json(listing.iter().collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/cancel",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Cancelled; message plus updated appointment"),
        (status = 404, description = "No such appointment, or a patient's cancel of someone else's", body = crate::error::ApiErrorResponse),
        (status = 409, description = "Already attended or cancelled", body = crate::error::ApiErrorResponse)
    ),
    tag = "appointments",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn cancel_appointment(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(appointment_id): Path<String>,
) -> Result<Json<TransitionOutcome>, ApiError> {
    auth.require_any(roles::ANY)?;
    if auth.role() == Role::Patient {
        // someone else's appointment looks exactly like a missing one
        let owned = server
            .appointments
            .get(&appointment_id)
            .is_ok_and(|appointment| appointment.patient.patient_id == auth.identifier());
        if !owned {
            debug!(appointment_id = %appointment_id, "Patient cancel refused: not an appointment of theirs");
            return Err(AppointmentError::NotFound(appointment_id).into());
        }
    }
    Ok(Json(server.appointments.cancel(&appointment_id)?))
}

#[utoipa::path(
    post,
    path = "/api/v1/appointments/{id}/fulfill",
    params(("id" = String, Path, description = "Appointment id")),
    responses(
        (status = 200, description = "Attended; message plus updated appointment"),
        (status = 404, description = "No such appointment", body = crate::error::ApiErrorResponse),
        (status = 409, description = "Already attended or cancelled", body = crate::error::ApiErrorResponse)
    ),
    tag = "appointments",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn fulfill_appointment(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(appointment_id): Path<String>,
) -> Result<Json<TransitionOutcome>, ApiError> {
    auth.require_any(roles::STAFF)?;
    Ok(Json(server.appointments.fulfill(&appointment_id)?))
}
