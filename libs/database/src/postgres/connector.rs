use sqlx::migrate::Migrator;
use sqlx::PgPool;
use tracing::info;

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult};

/// Connect using a PostgresConfig and verify the connection with a ping
///
/// This is the recommended way to connect when using configuration.
///
/// # Example
/// ```ignore
/// use database::postgres::{PostgresConfig, connect_from_config};
/// use core_config::FromEnv;
///
/// let config = PostgresConfig::from_env()?;
/// let pool = connect_from_config(&config).await?;
/// ```
pub async fn connect_from_config(config: &PostgresConfig) -> DatabaseResult<PgPool> {
    let options = config.connect_options()?;

    info!(
        host = options.get_host(),
        port = options.get_port(),
        user = options.get_username(),
        database = options.get_database().unwrap_or_default(),
        "Attempting to connect to PostgreSQL"
    );

    let pool = config
        .pool_options()
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::ConnectionFailed(e.to_string()))?;

    super::check_health(&pool).await?;

    info!(
        max_connections = config.max_connections,
        "Successfully connected to PostgreSQL database"
    );

    Ok(pool)
}

/// Run pending migrations with the provided migrator
///
/// The migration files live with the app (`sqlx::migrate!`); the running
/// logic is here.
///
/// # Example
/// ```ignore
/// static MIGRATOR: Migrator = sqlx::migrate!("../../manifests/migrations/products");
///
/// run_migrations(&pool, &MIGRATOR, "products_api").await?;
/// ```
pub async fn run_migrations(
    pool: &PgPool,
    migrator: &Migrator,
    app_name: &str,
) -> DatabaseResult<()> {
    info!("Running {} database migrations...", app_name);
    migrator.run(pool).await?;
    info!("Migrations completed successfully for {}", app_name);
    Ok(())
}

/// Close the pool, waiting for checked-out connections to be returned
pub async fn close(pool: &PgPool) {
    pool.close().await;
    info!("PostgreSQL connection pool closed");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_from_config_rejects_invalid_url() {
        let result = connect_from_config(&PostgresConfig::new("::not-a-url::")).await;
        assert!(matches!(result, Err(DatabaseError::ConfigError(_))));
    }
}
