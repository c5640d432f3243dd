//! Admin error types.

use thiserror::Error;

use rojarhat_backend::BackendError;
use rojarhat_core::messages;

/// Errors surfaced to the admin UI.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Every order source failed. Not the same as having no orders.
    #[error("{}: {last_error}", messages::ORDERS_NOT_LOADED)]
    OrdersUnavailable {
        /// The error from the last source tried.
        last_error: String,
    },

    /// A backend read failed outside the tiered order listing.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

/// A status change the backend refused.
///
/// Displays the backend's message verbatim.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct StatusUpdateError {
    pub message: String,
    #[source]
    pub source: BackendError,
}

impl From<BackendError> for StatusUpdateError {
    fn from(source: BackendError) -> Self {
        let message = match &source {
            BackendError::Api { message, .. }
            | BackendError::Rejected(message)
            | BackendError::NotFound(message)
            | BackendError::Unavailable(message) => message.clone(),
            other => other.to_string(),
        };
        Self { message, source }
    }
}
