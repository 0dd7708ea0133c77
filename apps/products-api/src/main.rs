//! Products API - REST server over PostgreSQL

use axum_helpers::server::{create_production_app, create_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use database::postgres::{self, Migrator};
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

static MIGRATOR: Migrator = sqlx::migrate!("../../manifests/migrations/products");

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    let pool = postgres::connect_from_config(&config.database).await?;
    postgres::run_migrations(&pool, &MIGRATOR, env!("CARGO_PKG_NAME")).await?;

    let state = AppState::new(pool.clone());
    let router = create_router::<openapi::ApiDoc>(api::routes(state), &config.server)?;

    info!(
        environment = ?config.environment,
        "Starting Products API on {}",
        config.server.address()
    );

    create_production_app(router, &config.server, async move {
        info!("Shutting down: closing PostgreSQL pool");
        postgres::close(&pool).await;
    })
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Products API shutdown complete");
    Ok(())
}
