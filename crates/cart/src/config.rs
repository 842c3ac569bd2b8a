//! Cart configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional.
//! - `SEPET_CART_KEY` - Storage key holding the cart snapshot (default: `cart`)
//! - `SEPET_RETAINED_KEYS` - Comma-separated keys that purges must never
//!   remove, in addition to the cart key (default: `token`)
//! - `SEPET_DEFAULT_NAME` - Name for products without `name`/`title` (default: `Ürün Adı`)
//! - `SEPET_PLACEHOLDER_IMAGE` - Image for products without one
//!   (default: `/images/placeholder.png`)
//! - `SEPET_STORAGE_QUOTA_BYTES` - Size limit of the durable storage medium
//!   (default: 5 MiB)

use sepet_core::ProductDefaults;
use thiserror::Error;

const DEFAULT_CART_KEY: &str = "cart";
const DEFAULT_RETAINED_KEYS: &str = "token";
const DEFAULT_STORAGE_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Cart configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    /// Storage key under which the cart snapshot is written
    pub cart_key: String,
    /// Keys other subsystems own (session token, consent flags, ...)
    pub retained_keys: Vec<String>,
    /// Fallback product name and image
    pub defaults: ProductDefaults,
    /// Byte quota of the durable storage medium
    pub storage_quota_bytes: usize,
}

impl Default for CartConfig {
    fn default() -> Self {
        Self {
            cart_key: DEFAULT_CART_KEY.to_string(),
            retained_keys: parse_key_list(DEFAULT_RETAINED_KEYS),
            defaults: ProductDefaults::default(),
            storage_quota_bytes: DEFAULT_STORAGE_QUOTA_BYTES,
        }
    }
}

impl CartConfig {
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

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let cart_key = get_or("SEPET_CART_KEY", DEFAULT_CART_KEY).trim().to_string();
        if cart_key.is_empty() {
            return Err(ConfigError::InvalidEnvVar(
                "SEPET_CART_KEY".to_string(),
                "must not be empty".to_string(),
            ));
        }

        let retained_keys = parse_key_list(&get_or("SEPET_RETAINED_KEYS", DEFAULT_RETAINED_KEYS));

        let defaults = ProductDefaults {
            name: get_or("SEPET_DEFAULT_NAME", ProductDefaults::NAME),
            image: get_or("SEPET_PLACEHOLDER_IMAGE", ProductDefaults::IMAGE),
        };

        let storage_quota_bytes = match lookup("SEPET_STORAGE_QUOTA_BYTES") {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::InvalidEnvVar("SEPET_STORAGE_QUOTA_BYTES".to_string(), e.to_string())
            })?,
            None => DEFAULT_STORAGE_QUOTA_BYTES,
        };

        Ok(Self {
            cart_key,
            retained_keys,
            defaults,
            storage_quota_bytes,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Split a comma-separated key list, dropping blanks.
fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
