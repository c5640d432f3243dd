//! CLI configuration.
//!
//! # Environment Variables
//!
//! - `LOG_FORMAT` - `text` (default) or `json`
//! - `RUST_LOG` - Log filter (default: `rojarhat=info,rojarhat_cli=info`)
//!
//! Storefront and backend variables are documented on
//! [`StorefrontConfig`] and [`BackendConfig`].

use std::sync::Arc;

use rojarhat_backend::config::get_env_or_default;
use rojarhat_backend::{BackendConfig, ConfigError, FileStorage, RestClient, StorageError};
use rojarhat_storefront::StorefrontConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "rojarhat=info,rojarhat_cli=info";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Read `LOG_FORMAT`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` for values other than `text` or `json`.
    pub fn from_env() -> Result<Self, ConfigError> {
        match get_env_or_default("LOG_FORMAT", "text").to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::InvalidEnvVar(
                "LOG_FORMAT".to_string(),
                format!("expected 'text' or 'json', got '{other}'"),
            )),
        }
    }
}

/// Initialize tracing. Logs go to stderr so command output stays clean.
pub fn init_tracing(format: LogFormat) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

/// Everything a command needs, loaded once.
pub struct Context {
    pub storefront: StorefrontConfig,
    pub storage: Arc<FileStorage>,
}

impl Context {
    /// Load storefront configuration and open device storage.
    ///
    /// Backend configuration is loaded separately by [`Context::client`] so
    /// cart edits and the wishlist work without backend credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or storage cannot be opened.
    pub fn load() -> Result<Self, Box<dyn std::error::Error>> {
        let storefront = StorefrontConfig::from_env()?;
        let storage = Arc::new(open_storage(&storefront)?);
        Ok(Self {
            storefront,
            storage,
        })
    }

    /// Build a REST client from the backend environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if backend configuration is missing or invalid.
    pub fn client(&self) -> Result<RestClient, Box<dyn std::error::Error>> {
        let config = BackendConfig::from_env()?;
        tracing::debug!(config = ?config, "Backend configured");
        Ok(RestClient::new(&config)?)
    }
}

fn open_storage(config: &StorefrontConfig) -> Result<FileStorage, StorageError> {
    FileStorage::open(&config.storage_dir)
}
