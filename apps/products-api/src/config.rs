//! Configuration for Products API

use core_config::{server::ServerConfig, FromEnv};
use database::postgres::PostgresConfig;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: PostgresConfig,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        Ok(Self {
            environment: Environment::from_env(),
            server: ServerConfig::from_env()?,
            database: PostgresConfig::from_env()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_from_env_with_database_url() {
        temp_env::with_vars(
            [
                ("APP_ENV", Some("production")),
                ("DATABASE_URL", Some("postgres://app:secret@db:5432/products")),
                ("PORT", Some("9090")),
                ("SHUTDOWN_TIMEOUT_SECS", Some("2")),
                ("CORS_ALLOWED_ORIGIN", None),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.environment, Environment::Production);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.shutdown_timeout, Duration::from_secs(2));
                assert!(config.server.cors_allowed_origins.is_empty());
            },
        );
    }

    #[test]
    fn test_from_env_requires_database_settings() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", None::<&str>),
                ("DB_HOST", None),
                ("DB_PORT", None),
                ("DB_USER", None),
                ("DB_NAME", None),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }

    #[test]
    fn test_from_env_rejects_bad_port() {
        temp_env::with_vars(
            [
                ("DATABASE_URL", Some("postgres://localhost/products")),
                ("PORT", Some("not-a-port")),
            ],
            || {
                assert!(Config::from_env().is_err());
            },
        );
    }
}
