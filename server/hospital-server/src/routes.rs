pub mod paths;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::{
    handlers::{appointments, auth, health, medications, patients, rooms, staff},
    openapi,
    server::HospitalServer,
};

/// Unauthenticated liveness and build info.
pub fn health_routes() -> Router<HospitalServer> {
    Router::new()
        .route(paths::health::HEALTH, get(health::health_check))
        .route(paths::health::VERSION, get(health::version_info))
}

pub fn auth_routes() -> Router<HospitalServer> {
    Router::new()
        .route(paths::api_v1::ME, get(auth::me))
        .route(paths::api_v1::MENU, get(auth::menu))
}

pub fn patient_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::api_v1::PATIENTS,
            get(patients::list_patients).post(patients::create_patient),
        )
        .route(paths::api_v1::PATIENT_SELF, get(patients::my_record))
        .route(paths::api_v1::PATIENT_BY_ID, delete(patients::delete_patient))
        .route(paths::api_v1::PATIENT_DOCTOR, post(patients::assign_doctor))
        .route(paths::api_v1::PATIENT_ROOM, post(patients::assign_room))
        .route(
            paths::api_v1::PATIENT_SIP,
            post(patients::create_sip)
                .get(patients::get_sip)
                .delete(patients::delete_sip),
        )
        .route(
            paths::api_v1::PATIENT_RECOMMENDATIONS,
            get(medications::recommendations),
        )
}

pub fn staff_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::api_v1::DOCTORS,
            get(staff::list_doctors).post(staff::create_doctor),
        )
        .route(paths::api_v1::DOCTOR_BY_ID, delete(staff::delete_doctor))
        .route(
            paths::api_v1::NURSES,
            get(staff::list_nurses).post(staff::create_nurse),
        )
        .route(paths::api_v1::NURSE_BY_ID, delete(staff::delete_nurse))
        .route(
            paths::api_v1::AIDES,
            get(staff::list_aides).post(staff::create_aide),
        )
        .route(paths::api_v1::AIDE_BY_ID, delete(staff::delete_aide))
}

pub fn room_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::api_v1::ROOMS,
            get(rooms::list_rooms).post(rooms::create_room),
        )
        .route(paths::api_v1::ROOM_BY_NUMBER, delete(rooms::delete_room))
        .route(paths::api_v1::ROOM_CLEAN, patch(rooms::clean_room))
}

pub fn medication_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::api_v1::MEDICATIONS,
            get(medications::list_medications).post(medications::create_medication),
        )
        .route(paths::api_v1::MEDICATION_INFO, get(medications::drug_info))
}

pub fn appointment_routes() -> Router<HospitalServer> {
    Router::new()
        .route(
            paths::api_v1::APPOINTMENTS,
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            paths::api_v1::APPOINTMENT_CANCEL,
            post(appointments::cancel_appointment),
        )
        .route(
            paths::api_v1::APPOINTMENT_FULFILL,
            post(appointments::fulfill_appointment),
        )
}

/// Everything under `/api/v1`. Each handler authenticates through
/// `AuthContext`.
pub fn api_v1_routes() -> Router<HospitalServer> {
    Router::new()
        .merge(auth_routes())
        .merge(patient_routes())
        .merge(staff_routes())
        .merge(room_routes())
        .merge(medication_routes())
        .merge(appointment_routes())
}

pub fn create_routes() -> Router<HospitalServer> {
    Router::new()
        .merge(health_routes())
        .merge(openapi::create_docs_routes())
        .nest(paths::API_V1, api_v1_routes())
}
