//! PostgreSQL database connector and utilities
//!
//! Provides pool configuration, connection, migrations and liveness checks.

mod config;
mod connector;
mod health;

pub use config::{ConnectionTarget, PostgresConfig};
pub use connector::{close, connect_from_config, run_migrations};
pub use health::check_health;

// Re-export sqlx types for convenience
pub use sqlx::migrate::Migrator;
pub use sqlx::PgPool;
