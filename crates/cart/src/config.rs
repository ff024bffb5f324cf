//! Cart engine configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `MEDRUSH_API_URL` - Base URL of the Medrush API (default: `http://localhost:5000/api`)
//! - `MEDRUSH_REQUEST_TIMEOUT_SECS` - Remote call timeout in seconds (default: 15)
//! - `MEDRUSH_CART_DB` - Path of the local cart snapshot database (default: `medrush_cart.redb`)

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

const DEFAULT_API_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_STORE_PATH: &str = "medrush_cart.redb";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart synchronization engine configuration.
#[derive(Debug, Clone)]
pub struct CartSyncConfig {
    /// Base URL of the Medrush API, e.g. `http://localhost:5000/api`.
    pub api_base_url: Url,
    /// Bounded timeout for every remote call, including order placement.
    pub request_timeout: Duration,
    /// Filesystem path of the durable local snapshot store.
    pub store_path: PathBuf,
}

impl CartSyncConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let api_base_url = get_env_or_default("MEDRUSH_API_URL", DEFAULT_API_URL)
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("MEDRUSH_API_URL".to_string(), e.to_string()))?;

        let timeout_secs = get_env_or_default(
            "MEDRUSH_REQUEST_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
        )
        .parse::<u64>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("MEDRUSH_REQUEST_TIMEOUT_SECS".to_string(), e.to_string())
        })?;

        let store_path = PathBuf::from(get_env_or_default("MEDRUSH_CART_DB", DEFAULT_STORE_PATH));

        Ok(Self {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            store_path,
        })
    }
}

impl Default for CartSyncConfig {
    fn default() -> Self {
        Self {
            // Static default URL; parse cannot fail
            api_base_url: Url::parse(DEFAULT_API_URL).unwrap_or_else(|_| unreachable!()),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
