//! Checkout configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `CHECKOUT_ENDPOINT_URL` - URL of the create-order endpoint
//!
//! ## Optional
//! - `CHECKOUT_API_KEY` - API key sent as `apikey` and bearer token
//! - `CHECKOUT_TIMEOUT_SECS` - Order endpoint call timeout (default: 15)
//! - `CHECKOUT_DELIVERY_FEE` - Flat delivery fee (default: 99)
//! - `CHECKOUT_REQUIRE_CUSTOMER_INFO` - Require shipping details (default: true)
//! - `CHECKOUT_CACHE_DIR` - Directory for the on-device cart cache (default: .quickcart)

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use quickcart_core::{DEFAULT_DELIVERY_FEE, Money};
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_CACHE_DIR: &str = ".quickcart";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Checkout configuration.
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Create-order endpoint
    pub endpoint_url: Url,
    /// API key for the hosted backend
    pub api_key: Option<SecretString>,
    /// Timeout applied to each order endpoint call
    pub timeout: Duration,
    /// Flat delivery fee for non-empty carts
    pub delivery_fee: Money,
    /// Whether `submit` requires valid customer info
    pub require_customer_info: bool,
    /// Where the file-backed cart cache lives
    pub cache_dir: PathBuf,
}

impl CheckoutConfig {
    /// Configuration with defaults for everything but the endpoint.
    #[must_use]
    pub fn new(endpoint_url: Url) -> Self {
        Self {
            endpoint_url,
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            delivery_fee: Money::from_units(DEFAULT_DELIVERY_FEE),
            require_customer_info: true,
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
        }
    }

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

        let endpoint_url = parse_env::<Url>(
            "CHECKOUT_ENDPOINT_URL",
            &get_required_env("CHECKOUT_ENDPOINT_URL")?,
        )?;
        let api_key = get_optional_env("CHECKOUT_API_KEY").map(SecretString::from);
        let timeout_secs = parse_env::<u64>(
            "CHECKOUT_TIMEOUT_SECS",
            &get_env_or_default("CHECKOUT_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string()),
        )?;
        let delivery_fee = parse_money(
            "CHECKOUT_DELIVERY_FEE",
            &get_env_or_default("CHECKOUT_DELIVERY_FEE", &DEFAULT_DELIVERY_FEE.to_string()),
        )?;
        let require_customer_info = parse_bool(
            "CHECKOUT_REQUIRE_CUSTOMER_INFO",
            &get_env_or_default("CHECKOUT_REQUIRE_CUSTOMER_INFO", "true"),
        )?;
        let cache_dir = PathBuf::from(get_env_or_default("CHECKOUT_CACHE_DIR", DEFAULT_CACHE_DIR));

        Ok(Self {
            endpoint_url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
            delivery_fee,
            require_customer_info,
            cache_dir,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
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

fn parse_money(key: &str, value: &str) -> Result<Money, ConfigError> {
    let amount = parse_env::<Decimal>(key, value)?;
    Money::new(amount).map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}
