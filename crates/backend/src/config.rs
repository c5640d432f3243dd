//! Backend configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `BACKEND_URL` - Base URL of the hosted backend (e.g., `https://xyz.supabase.co`)
//! - `BACKEND_API_KEY` - Project API key sent as `apikey` and bearer token
//!
//! ## Optional
//! - `BACKEND_TIMEOUT_SECS` - Per-request timeout (default: 15)
//! - `BACKEND_ORDER_RPC` - Atomic order procedure name (default: `place_order`)

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_ORDER_RPC: &str = "place_order";

/// Project keys are long JWTs or prefixed publishable keys.
const MIN_API_KEY_LEN: usize = 20;
const MIN_API_KEY_ENTROPY: f64 = 3.3;

/// Values copied from setup guides instead of the real key.
///
/// Matched case-insensitively against the start of the key only.
const PLACEHOLDER_PREFIXES: &[&str] = &[
    "your-", "your_", "<", "{{", "$", "changeme", "replace", "placeholder", "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Hosted backend configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Base URL of the backend project
    pub url: Url,
    /// Project API key
    pub api_key: SecretString,
    /// Per-request timeout
    pub timeout: Duration,
    /// Name of the atomic order-placement procedure
    pub order_rpc: String,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .field("order_rpc", &self.order_rpc)
            .finish()
    }
}

impl BackendConfig {
    /// Build a configuration with default timeout and procedure name.
    #[must_use]
    pub fn new(url: Url, api_key: SecretString) -> Self {
        Self {
            url,
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            order_rpc: DEFAULT_ORDER_RPC.to_string(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the API key looks like a placeholder rather than an issued key.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let url = get_required_env("BACKEND_URL")?
            .parse::<Url>()
            .map_err(|e| ConfigError::InvalidEnvVar("BACKEND_URL".to_string(), e.to_string()))?;
        let api_key = get_api_key("BACKEND_API_KEY")?;
        let timeout_secs = get_env_or_default("BACKEND_TIMEOUT_SECS", "15")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("BACKEND_TIMEOUT_SECS".to_string(), e.to_string())
            })?;
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "BACKEND_TIMEOUT_SECS".to_string(),
                "must be greater than zero".to_string(),
            ));
        }
        let order_rpc = get_env_or_default("BACKEND_ORDER_RPC", DEFAULT_ORDER_RPC);

        Ok(Self {
            url,
            api_key,
            timeout: Duration::from_secs(timeout_secs),
            order_rpc,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
///
/// # Errors
///
/// Returns `ConfigError::MissingEnvVar` if the variable is not set.
pub fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
#[must_use]
pub fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
#[must_use]
pub fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Parse a boolean flag (`1`/`true`/`yes`/`on`, case-insensitive).
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for any other non-empty value.
pub fn get_flag(key: &str) -> Result<bool, ConfigError> {
    match get_optional_env(key).map(|v| v.trim().to_lowercase()).as_deref() {
        None | Some("" | "0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(other) => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got '{other}'"),
        )),
    }
}

/// Shannon entropy of `s` in bits per character (not per byte).
fn entropy_bits_per_char(s: &str) -> f64 {
    let mut freq: HashMap<char, u32> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_default() += 1;
    }
    let total: u32 = freq.values().sum();
    if total == 0 {
        return 0.0;
    }

    let total = f64::from(total);
    freq.values()
        .map(|&count| {
            let p = f64::from(count) / total;
            -p * p.log2()
        })
        .sum()
}

/// Reject values that cannot be a project API key issued by the backend.
///
/// Returns the reason the key was refused.
fn check_api_key(key: &str) -> Result<(), String> {
    if key.chars().any(char::is_whitespace) {
        return Err("contains whitespace".to_string());
    }

    let lower = key.to_lowercase();
    if let Some(prefix) = PLACEHOLDER_PREFIXES.iter().find(|p| lower.starts_with(**p)) {
        return Err(format!("looks like a placeholder (starts with '{prefix}')"));
    }

    let len = key.chars().count();
    if len < MIN_API_KEY_LEN {
        return Err(format!("too short ({len} chars, need >= {MIN_API_KEY_LEN})"));
    }

    let entropy = entropy_bits_per_char(key);
    if entropy < MIN_API_KEY_ENTROPY {
        return Err(format!(
            "entropy too low ({entropy:.2} bits/char, need >= {MIN_API_KEY_ENTROPY:.1}). \
             Use the key issued by the backend."
        ));
    }

    Ok(())
}

/// Load the API key from `var` and check it.
fn get_api_key(var: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(var)?;
    check_api_key(&value).map_err(|reason| ConfigError::InsecureSecret(var.to_string(), reason))?;
    Ok(SecretString::from(value))
}
