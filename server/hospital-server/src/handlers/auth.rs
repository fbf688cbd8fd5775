use auth_identity::Role;
use axum::response::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::middleware::{roles, AuthContext};

#[derive(Debug, Serialize, ToSchema)]
pub struct MeResponse {
    pub identifier: String,
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MenuResponse {
    pub role: String,
    pub menu: Vec<String>,
}

/// Options offered to each role by the front desk client.
#[must_use]
pub fn menu_for(role: Role) -> &'static [&'static str] {
    match role {
        Role::Patient => &["View info", "Request appointment", "Recommend medication"],
        Role::Doctor => &["List patients", "View appointments", "Medical history"],
        Role::Nurse => &["View rooms", "Assign patient", "Clean room"],
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "The authenticated principal", body = MeResponse),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ApiErrorResponse),
        (status = 403, description = "Unknown role", body = crate::error::ApiErrorResponse)
    ),
    tag = "authentication",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn me(auth: AuthContext) -> Result<Json<MeResponse>, ApiError> {
    auth.require_any(roles::ANY)?;
    Ok(Json(MeResponse {
        identifier: auth.identifier().to_string(),
        role: auth.role().to_string(),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/menu",
    responses(
        (status = 200, description = "Menu options for the caller's role", body = MenuResponse),
        (status = 401, description = "Missing or invalid credentials", body = crate::error::ApiErrorResponse)
    ),
    tag = "authentication",
    security(("basic_auth" = [], "role_header" = []))
)]
pub async fn menu(auth: AuthContext) -> Result<Json<MenuResponse>, ApiError> {
    auth.require_any(roles::ANY)?;
    Ok(Json(MenuResponse {
        role: auth.role().to_string(),
        menu: menu_for(auth.role()).iter().map(ToString::to_string).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_role_has_a_menu() {
        for role in Role::ALL {
            assert_eq!(menu_for(role).len(), 3);
        }
        assert!(menu_for(Role::Nurse).contains(&"Clean room"));
    }
}
