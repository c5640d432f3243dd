//! Backend and storage error types.

use thiserror::Error;

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with an error body.
    #[error("backend error ({status}{}): {message}", format_code(.code))]
    Api {
        /// HTTP status code.
        status: u16,
        /// Backend error code (e.g., a `PostgREST` or SQLSTATE code).
        code: Option<String>,
        /// Backend error message.
        message: String,
    },

    /// The stored procedure is not deployed.
    #[error("procedure not found: {0}")]
    ProcedureMissing(String),

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The stored procedure ran and refused the request (e.g., insufficient stock).
    #[error("rejected: {0}")]
    Rejected(String),

    /// No row matched the request.
    #[error("not found: {0}")]
    NotFound(String),

    /// The response was missing data the caller needs.
    #[error("missing data: {0}")]
    MissingData(String),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A request URL could not be built.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The backend is unreachable.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend accepted a write but its answer could not be read.
    /// The write may have been committed.
    #[error("outcome unknown: {0}")]
    OutcomeUnknown(String),
}

#[allow(clippy::ref_option)]
fn format_code(code: &Option<String>) -> String {
    code.as_ref().map(|c| format!(", {c}")).unwrap_or_default()
}

impl BackendError {
    /// Whether a retry or a fallback source could plausibly succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout | Self::RateLimited(_) | Self::Unavailable(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::ProcedureMissing(_)
            | Self::Rejected(_)
            | Self::NotFound(_)
            | Self::MissingData(_)
            | Self::Parse(_)
            | Self::Url(_)
            | Self::OutcomeUnknown(_) => false,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(err)
        }
    }
}

/// Errors from device-local storage.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Reading or writing the underlying store failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored payload could not be (de)serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored payload was written by an incompatible version.
    #[error("unsupported schema version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version found in the payload.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },

    /// The key contains characters that are not allowed.
    #[error("invalid storage key: {0}")]
    InvalidKey(String),
}
