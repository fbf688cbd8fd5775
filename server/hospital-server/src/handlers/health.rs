use std::collections::BTreeMap;

use axum::{extract::State, response::Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::server::HospitalServer;

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub version: String,
    pub uptime: u64,
    pub checks: BTreeMap<String, String>,
}

/// Version information response
#[derive(Debug, Serialize, ToSchema)]
pub struct VersionResponse {
    pub name: String,
    pub version: String,
    pub record_store: String,
}

fn backend_name(server: &HospitalServer) -> &'static str {
    if server.pool.is_some() {
        "postgres"
    } else {
        "memory"
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Server is up; per-component checks inside", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(server): State<HospitalServer>) -> Json<HealthResponse> {
    let mut checks = BTreeMap::new();

    let store_status = match &server.pool {
        Some(pool) if !database_layer::is_healthy(pool).await => "unhealthy",
        _ => "healthy",
    };
    checks.insert("record_store".to_string(), store_status.to_string());
    checks.insert(
        "appointments".to_string(),
        format!("{} stored", server.appointments.len()),
    );

    let status = if store_status == "healthy" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime: server.uptime_secs(),
        checks,
    })
}

#[utoipa::path(
    get,
    path = "/version",
    responses(
        (status = 200, description = "Build information", body = VersionResponse)
    ),
    tag = "health"
)]
pub async fn version_info(State(server): State<HospitalServer>) -> Json<VersionResponse> {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        record_store: backend_name(&server).to_string(),
    })
}
