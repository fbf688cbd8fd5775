use axum::Router;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::routes::paths;
use crate::server::HospitalServer;

/// OpenAPI document for the whole server.
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::handlers::health::health_check,
        crate::handlers::health::version_info,

        // Authentication endpoints
        crate::handlers::auth::me,
        crate::handlers::auth::menu,

        // Patient endpoints
        crate::handlers::patients::list_patients,
        crate::handlers::patients::create_patient,
        crate::handlers::patients::my_record,
        crate::handlers::patients::delete_patient,
        crate::handlers::patients::assign_doctor,
        crate::handlers::patients::assign_room,
        crate::handlers::patients::create_sip,
        crate::handlers::patients::get_sip,
        crate::handlers::patients::delete_sip,

        // Staff endpoints
        crate::handlers::staff::list_doctors,
        crate::handlers::staff::create_doctor,
        crate::handlers::staff::delete_doctor,
        crate::handlers::staff::list_nurses,
        crate::handlers::staff::create_nurse,
        crate::handlers::staff::delete_nurse,
        crate::handlers::staff::list_aides,
        crate::handlers::staff::create_aide,
        crate::handlers::staff::delete_aide,

        // Room endpoints
        crate::handlers::rooms::list_rooms,
        crate::handlers::rooms::create_room,
        crate::handlers::rooms::clean_room,
        crate::handlers::rooms::delete_room,

        // Medication endpoints
        crate::handlers::medications::list_medications,
        crate::handlers::medications::create_medication,
        crate::handlers::medications::drug_info,
        crate::handlers::medications::recommendations,

        // Appointment endpoints
        crate::handlers::appointments::create_appointment,
        crate::handlers::appointments::list_appointments,
        crate::handlers::appointments::cancel_appointment,
        crate::handlers::appointments::fulfill_appointment,
    ),
    components(
        schemas(
            crate::error::ApiErrorResponse,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::VersionResponse,
            crate::handlers::auth::MeResponse,
            crate::handlers::auth::MenuResponse,
            crate::handlers::patients::CreatePatientRequest,
            crate::handlers::patients::AssignDoctorRequest,
            crate::handlers::patients::AssignRoomRequest,
            crate::handlers::staff::CreateStaffRequest,
            crate::handlers::staff::CreateAideRequest,
            crate::handlers::rooms::CreateRoomRequest,
            crate::handlers::medications::CreateMedicationRequest,
            crate::handlers::medications::RecommendationResponse,
            crate::handlers::appointments::CreateAppointmentRequest,
            crate::handlers::appointments::CreatedAppointment,
            crate::services::AllergenCheck,
            crate::services::AllergenStatus,
            database_layer::Patient,
            database_layer::Condition,
            database_layer::StaffMember,
            database_layer::Aide,
            database_layer::Room,
            database_layer::Sip,
            database_layer::Medication,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Liveness and build information"),
        (name = "authentication", description = "Who am I and what may I do"),
        (name = "patients", description = "Patient records, room and doctor assignment, SIP numbers"),
        (name = "staff", description = "Doctors, nurses and aides"),
        (name = "rooms", description = "Rooms and cleaning"),
        (name = "medications", description = "Medication catalog, RxNorm lookup, recommendations"),
        (name = "appointments", description = "In-person, phone and emergency appointments"),
    ),
    info(
        title = "Hospital Engine API",
        version = "0.1.0",
        description = "Role-gated hospital API. Authenticate every request with HTTP Basic credentials plus an X-Role header (patient, doctor or nurse).",
    ),
)]
pub struct ApiDoc;

/// Registers the HTTP Basic and `X-Role` schemes the paths refer to.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "basic_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Basic)),
        );
        components.add_security_scheme(
            "role_header",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Role"))),
        );
    }
}

/// Swagger UI plus the raw JSON document.
pub fn create_docs_routes() -> Router<HospitalServer> {
    Router::new()
        .merge(SwaggerUi::new(paths::docs::SWAGGER_UI).url(paths::docs::OPENAPI_JSON, ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_appointment_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/v1/appointments"));
        assert!(doc.paths.paths.contains_key("/api/v1/appointments/{id}/cancel"));
        assert!(doc
            .components
            .as_ref()
            .is_some_and(|c| c.security_schemes.contains_key("basic_auth")));
    }
}
