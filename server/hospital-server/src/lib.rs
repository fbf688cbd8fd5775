//! Hospital Server - role-gated hospital records and appointments API
//!
//! Exposes the record store, the appointment manager and the medication
//! catalog over HTTP. Every `/api/v1` request carries HTTP Basic
//! credentials plus an `X-Role` header checked by the auth gate.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

// Re-export commonly used types
pub use config::ServerConfig;
pub use error::{ApiError, ApiErrorResponse};
pub use server::HospitalServer;

use axum::{middleware::from_fn, Router};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Create the main application router with all routes and middleware
pub fn create_app(server: HospitalServer) -> Router {
    let cors = middleware::create_cors_layer(&server.config.cors_origins);

    routes::create_routes()
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(from_fn(middleware::request_timing_middleware)),
        )
        .with_state(server)
}
