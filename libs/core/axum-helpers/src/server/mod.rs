//! Server infrastructure module.
//!
//! This module provides:
//! - Router assembly with OpenAPI documentation and common middleware
//! - Aggregated health checks
//! - Graceful shutdown with a bounded drain period
//!
//! # Example
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router};
//!
//! let router = create_router::<ApiDoc>(api_routes, &config.server)?;
//! create_production_app(router, &config.server, async move { pool.close().await }).await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router, serve_until};
pub use health::{HealthCheckFuture, run_health_checks};
pub use shutdown::ShutdownCoordinator;
