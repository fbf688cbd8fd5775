//! Route path constants.
//!
//! Runtime routes use these; the `#[utoipa::path]` attributes spell the
//! same paths with `{param}` placeholders and must be kept in step.

pub const API_V1: &str = "/api/v1";

pub mod health {
    pub const HEALTH: &str = "/health";
    pub const VERSION: &str = "/version";
}

pub mod docs {
    pub const OPENAPI_JSON: &str = "/api-docs/openapi.json";
    pub const SWAGGER_UI: &str = "/swagger-ui";
}

/// Relative to [`API_V1`](super::API_V1).
pub mod api_v1 {
    pub const ME: &str = "/me";
    pub const MENU: &str = "/menu";

    pub const PATIENTS: &str = "/patients";
    pub const PATIENT_SELF: &str = "/patients/me";
    pub const PATIENT_BY_ID: &str = "/patients/:id";
    pub const PATIENT_DOCTOR: &str = "/patients/:id/doctor";
    pub const PATIENT_ROOM: &str = "/patients/:id/room";
    pub const PATIENT_SIP: &str = "/patients/:id/sip";
    pub const PATIENT_RECOMMENDATIONS: &str = "/patients/:id/recommendations";

    pub const DOCTORS: &str = "/doctors";
    pub const DOCTOR_BY_ID: &str = "/doctors/:id";
    pub const NURSES: &str = "/nurses";
    pub const NURSE_BY_ID: &str = "/nurses/:id";
    pub const AIDES: &str = "/aides";
    pub const AIDE_BY_ID: &str = "/aides/:id";

    pub const ROOMS: &str = "/rooms";
    pub const ROOM_BY_NUMBER: &str = "/rooms/:number";
    pub const ROOM_CLEAN: &str = "/rooms/:number/clean";

    pub const MEDICATIONS: &str = "/medications";
    pub const MEDICATION_INFO: &str = "/medications/info";

    pub const APPOINTMENTS: &str = "/appointments";
    pub const APPOINTMENT_CANCEL: &str = "/appointments/:id/cancel";
    pub const APPOINTMENT_FULFILL: &str = "/appointments/:id/fulfill";
}
