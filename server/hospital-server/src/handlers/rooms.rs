use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use database_layer::Room;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::middleware::{roles, ApiJson, AuthContext};
use crate::server::HospitalServer;
use crate::validate_field;
use crate::validation::RequestValidation;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
    pub number: i32,
    pub capacity: i32,
}

impl RequestValidation for CreateRoomRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_field!("number", self.number > 0, "number must be positive");
        validate_field!("capacity", self.capacity > 0, "capacity must be positive");
        Ok(())
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/rooms",
    responses(
        (status = 200, description = "All rooms", body = Vec<Room>)
    ),
    tag = "rooms",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn list_rooms(
    State(server): State<HospitalServer>,
    auth: AuthContext,
) -> Result<Json<Vec<Room>>, ApiError> {
    auth.require_any(roles::STAFF)?;
    Ok(Json(server.records.list_rooms().await?))
}

#[utoipa::path(
    post,
    path = "/api/v1/rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Room created, initially not clean", body = Room),
        (status = 400, description = "Invalid request", body = crate::error::ApiErrorResponse),
        (status = 409, description = "Room number taken", body = crate::error::ApiErrorResponse)
    ),
    tag = "rooms",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn create_room(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    ApiJson(request): ApiJson<CreateRoomRequest>,
) -> Result<(StatusCode, Json<Room>), ApiError> {
    auth.require_any(roles::STAFF)?;
    request.validate()?;
    let room = server
        .records
        .insert_room(Room {
            number: request.number,
            capacity: request.capacity,
            clean: false,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(room)))
}

#[utoipa::path(
    patch,
    path = "/api/v1/rooms/{number}/clean",
    params(("number" = i32, Path, description = "Room number")),
    responses(
        (status = 200, description = "Room marked clean", body = Room),
        (status = 404, description = "No such room", body = crate::error::ApiErrorResponse)
    ),
    tag = "rooms",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn clean_room(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(number): Path<i32>,
) -> Result<Json<Room>, ApiError> {
    auth.require_any(roles::NURSE)?;
    let room = server.records.clean_room(number).await?;
    info!(room = number, nurse_id = %auth.identifier(), "Room cleaned");
    Ok(Json(room))
}

#[utoipa::path(
    delete,
    path = "/api/v1/rooms/{number}",
    params(("number" = i32, Path, description = "Room number")),
    responses(
        (status = 204, description = "Room removed; occupants moved out"),
        (status = 404, description = "No such room", body = crate::error::ApiErrorResponse)
    ),
    tag = "rooms",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn delete_room(
    State(server): State<HospitalServer>,
    auth: AuthContext,
    Path(number): Path<i32>,
) -> Result<StatusCode, ApiError> {
    auth.require_any(roles::DOCTOR)?;
    server.records.delete_room(number).await?;
    Ok(StatusCode::NO_CONTENT)
}
