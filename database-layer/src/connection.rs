use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::error::{DatabaseError, DatabaseResult};

/// Open a Postgres pool.
///
/// # Errors
///
/// [`DatabaseError::ConnectionFailed`] when the server cannot be reached.
pub async fn connect(url: &str, max_connections: u32) -> DatabaseResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .idle_timeout(Duration::from_secs(600))
        .max_lifetime(Duration::from_secs(1800))
        .connect(url)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    info!(max_connections, "Database connection pool created");
    Ok(pool)
}

/// `SELECT 1` against the pool.
pub async fn is_healthy(pool: &PgPool) -> bool {
    match sqlx::query("SELECT 1").fetch_one(pool).await {
        Ok(_) => true,
        Err(e) => {
            warn!("Database health check failed: {}", e);
            false
        }
    }
}
