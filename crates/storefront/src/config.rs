//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `RH_STORAGE_DIR` - Directory for device-local state (default: `.rojarhat`)
//! - `CHECKOUT_VERIFY_TOTAL` - Refuse orders whose total does not match the
//!   line items (default: false)
//!
//! Backend variables are read by [`rojarhat_backend::BackendConfig`].

use std::path::PathBuf;

use rojarhat_backend::config::{ConfigError, get_env_or_default, get_flag};

const DEFAULT_STORAGE_DIR: &str = ".rojarhat";

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Where cart, wishlist and the order mirror are kept
    pub storage_dir: PathBuf,
    /// Checkout behavior
    pub checkout: CheckoutConfig,
}

/// Checkout behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckoutConfig {
    /// Fail checkout when the submitted total differs from the line items.
    /// When off, a mismatch is only logged.
    pub verify_total: bool,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a flag has an unrecognized value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            storage_dir: PathBuf::from(get_env_or_default("RH_STORAGE_DIR", DEFAULT_STORAGE_DIR)),
            checkout: CheckoutConfig {
                verify_total: get_flag("CHECKOUT_VERIFY_TOTAL")?,
            },
        })
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            storage_dir: PathBuf::from(DEFAULT_STORAGE_DIR),
            checkout: CheckoutConfig::default(),
        }
    }
}
