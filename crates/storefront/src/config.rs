//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SOLESTRIDE_BACKEND_URL` - Base URL of the hosted backend project
//! - `SOLESTRIDE_BACKEND_ANON_KEY` - Public API key for the hosted backend
//!
//! ## Optional
//! - `SOLESTRIDE_DATA_DIR` - Directory for the device-local store
//!   (default: `.solestride`)
//! - `SOLESTRIDE_ORDERS_TABLE` - Orders table name (default: `orders`)
//! - `SOLESTRIDE_COD_SHIPPING_FEE` - Flat cash-on-delivery shipping fee
//!   (default: 299)

use std::path::PathBuf;

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Hosted backend connection settings
    pub backend: BackendConfig,
    /// Directory holding the device-local cart/wishlist mirror
    pub data_dir: PathBuf,
    /// Flat shipping fee charged for cash-on-delivery orders
    pub cod_shipping_fee: Decimal,
}

/// Hosted backend connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the backend project (e.g. `https://xyz.supabase.co`)
    pub base_url: String,
    /// Public ("anon") API key sent with every request
    pub anon_key: SecretString,
    /// Table receiving order inserts
    pub orders_table: String,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("anon_key", &"[REDACTED]")
            .field("orders_table", &self.orders_table)
            .finish()
    }
}

impl StorefrontConfig {
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

        let base_url = get_required_env("SOLESTRIDE_BACKEND_URL")?
            .trim_end_matches('/')
            .to_string();
        let anon_key = SecretString::from(get_required_env("SOLESTRIDE_BACKEND_ANON_KEY")?);
        let orders_table = get_env_or_default("SOLESTRIDE_ORDERS_TABLE", "orders");
        let data_dir = PathBuf::from(get_env_or_default("SOLESTRIDE_DATA_DIR", ".solestride"));
        let cod_shipping_fee = get_env_or_default("SOLESTRIDE_COD_SHIPPING_FEE", "299")
            .parse::<Decimal>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("SOLESTRIDE_COD_SHIPPING_FEE".to_string(), e.to_string())
            })?;

        Ok(Self {
            backend: BackendConfig {
                base_url,
                anon_key,
                orders_table,
            },
            data_dir,
            cod_shipping_fee,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_config_debug_redacts_anon_key() {
        let config = BackendConfig {
            base_url: "https://example.supabase.co".to_string(),
            anon_key: SecretString::from("super_secret_anon_key"),
            orders_table: "orders".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("https://example.supabase.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_anon_key"));
    }

    #[test]
    fn test_missing_env_error_names_variable() {
        let err = ConfigError::MissingEnvVar("SOLESTRIDE_BACKEND_URL".to_string());
        assert_eq!(
            err.to_string(),
            "Missing environment variable: SOLESTRIDE_BACKEND_URL"
        );
    }
}
