use sqlx::PgPool;
use tracing::debug;

use crate::common::DatabaseError;

/// Check PostgreSQL database health
///
/// Executes `SELECT 1` to verify a connection can be acquired and used.
///
/// # Returns
/// * `Ok(())` if the database is healthy
/// * `Err(DatabaseError::HealthCheckFailed)` otherwise
pub async fn check_health(pool: &PgPool) -> Result<(), DatabaseError> {
    debug!("Running PostgreSQL health check");

    sqlx::query("SELECT 1").execute(pool).await.map_err(|e| {
        DatabaseError::HealthCheckFailed(format!("PostgreSQL health check failed: {}", e))
    })?;

    debug!("PostgreSQL health check passed");
    Ok(())
}
