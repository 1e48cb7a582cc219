//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `EASEL_API_BASE_URL` - Base URL of the marketplace REST API
//!   (e.g., `http://localhost:8000/api/`)
//!
//! ## Optional
//! - `EASEL_SESSION_FILE` - Path of the durable session file
//!   (default: `.easel/session.json`)
//! - `EASEL_REQUEST_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `EASEL_TAX_RATE` - Checkout tax rate estimate (default: 0.18)
//! - `EASEL_SHIPPING_FLAT_FEE` - Flat shipping fee (default: 50)
//! - `EASEL_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is
//!   free (default: 500; at exactly the threshold shipping is charged)

use std::path::PathBuf;
use std::time::Duration;

use rust_decimal::Decimal;
use thiserror::Error;
use url::Url;

use easel_core::Price;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront client configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Base URL of the marketplace REST API.
    pub api_base_url: Url,
    /// Path of the durable session file (token + user).
    pub session_file: PathBuf,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Client-side checkout estimate rates.
    pub checkout: CheckoutRates,
}

/// Rates used for the client-side order total estimate.
///
/// These are business configuration, not engineering constants: the
/// backend recomputes authoritative totals on order creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRates {
    /// Tax as a fraction of the subtotal.
    pub tax_rate: Decimal,
    /// Flat shipping fee charged at or below the free-shipping threshold.
    pub shipping_flat_fee: Price,
    /// Subtotal strictly above which shipping is free.
    pub free_shipping_threshold: Price,
}

impl Default for CheckoutRates {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(18, 2),
            shipping_flat_fee: Price::from_major(50),
            free_shipping_threshold: Price::from_major(500),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from a `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_required_env("EASEL_API_BASE_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("EASEL_API_BASE_URL".to_string(), e.to_string())
            })?;

        let session_file =
            PathBuf::from(get_env_or_default("EASEL_SESSION_FILE", ".easel/session.json"));

        let timeout_secs = get_env_or_default("EASEL_REQUEST_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("EASEL_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let checkout = CheckoutRates {
            tax_rate: parse_decimal_env("EASEL_TAX_RATE", "0.18")?,
            shipping_flat_fee: Price::new(parse_decimal_env("EASEL_SHIPPING_FLAT_FEE", "50")?),
            free_shipping_threshold: Price::new(parse_decimal_env(
                "EASEL_FREE_SHIPPING_THRESHOLD",
                "500",
            )?),
        };

        Ok(Self {
            api_base_url,
            session_file,
            request_timeout: Duration::from_secs(timeout_secs),
            checkout,
        })
    }
}

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a decimal-valued environment variable with a default.
fn parse_decimal_env(key: &str, default: &str) -> Result<Decimal, ConfigError> {
    get_env_or_default(key, default)
        .parse::<Decimal>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}
