//! API routes module

pub mod health;

use axum::Router;
use domain_products::{handlers, PgProductRepository, ProductService};

use crate::state::AppState;

/// Create all API routes
pub fn routes(state: AppState) -> Router {
    let service = ProductService::new(PgProductRepository::new(state.pool.clone()));

    Router::new()
        .merge(handlers::router(service))
        .merge(health::router(state))
}
