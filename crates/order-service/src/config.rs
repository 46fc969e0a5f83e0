//! Order service configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ORDER_SERVICE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! ## Optional
//! - `ORDER_SERVICE_HOST` - Bind address (default: 127.0.0.1)
//! - `ORDER_SERVICE_PORT` - Listen port (default: 3000)
//! - `ORDER_SERVICE_DELIVERY_FEE` - Flat delivery fee (default: 99)
//! - `ORDER_SERVICE_CHANGE_FEED_CAPACITY` - Buffered change events per subscriber (default: 256)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error event sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Performance trace sample rate (default: 0.0)

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use quickcart_core::{DEFAULT_DELIVERY_FEE, Money};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_CHANGE_FEED_CAPACITY: usize = 256;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Order service configuration.
#[derive(Debug, Clone)]
pub struct OrderServiceConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Flat delivery fee used when pricing incoming carts
    pub delivery_fee: Money,
    /// Change feed buffer size
    pub change_feed_capacity: usize,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. production, staging)
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate
    pub sentry_traces_sample_rate: f32,
}

impl OrderServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ORDER_SERVICE_DATABASE_URL")?;
        let host = parse_env::<IpAddr>(
            "ORDER_SERVICE_HOST",
            &get_env_or_default("ORDER_SERVICE_HOST", "127.0.0.1"),
        )?;
        let port = parse_env::<u16>(
            "ORDER_SERVICE_PORT",
            &get_env_or_default("ORDER_SERVICE_PORT", "3000"),
        )?;
        let fee = parse_env::<Decimal>(
            "ORDER_SERVICE_DELIVERY_FEE",
            &get_env_or_default("ORDER_SERVICE_DELIVERY_FEE", &DEFAULT_DELIVERY_FEE.to_string()),
        )?;
        let delivery_fee = Money::new(fee).map_err(|e| {
            ConfigError::InvalidEnvVar("ORDER_SERVICE_DELIVERY_FEE".to_string(), e.to_string())
        })?;
        let change_feed_capacity = parse_env::<usize>(
            "ORDER_SERVICE_CHANGE_FEED_CAPACITY",
            &get_env_or_default(
                "ORDER_SERVICE_CHANGE_FEED_CAPACITY",
                &DEFAULT_CHANGE_FEED_CAPACITY.to_string(),
            ),
        )?;
        if change_feed_capacity == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ORDER_SERVICE_CHANGE_FEED_CAPACITY".to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            database_url,
            host,
            port,
            delivery_fee,
            change_feed_capacity,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", &get_env_or_default("SENTRY_SAMPLE_RATE", "1.0"))?,
            sentry_traces_sample_rate: parse_env(
                "SENTRY_TRACES_SAMPLE_RATE",
                &get_env_or_default("SENTRY_TRACES_SAMPLE_RATE", "0.0"),
            )?,
        })
    }

    /// Configuration for tests and local tooling: loopback, default fee.
    #[must_use]
    pub fn local(database_url: &str) -> Self {
        Self {
            database_url: SecretString::from(database_url.to_string()),
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            delivery_fee: Money::from_units(DEFAULT_DELIVERY_FEE),
            change_feed_capacity: DEFAULT_CHANGE_FEED_CAPACITY,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    // Try primary key first (e.g., ORDER_SERVICE_DATABASE_URL)
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    // Fallback to generic DATABASE_URL (set by Fly.io postgres attach)
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_errors_name_the_variable() {
        let err = parse_env::<u16>("ORDER_SERVICE_PORT", "99999").unwrap_err();
        assert!(
            matches!(err, ConfigError::InvalidEnvVar(ref key, _) if key == "ORDER_SERVICE_PORT")
        );
    }

    #[test]
    fn test_socket_addr() {
        let config = OrderServiceConfig::local("postgres://localhost/test");
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.delivery_fee, Money::from_units(99));
    }
}
