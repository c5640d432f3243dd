//! Order status changes.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use rojarhat_backend::StoreBackend;
use rojarhat_core::{OrderId, OrderStatus};

use crate::error::StatusUpdateError;

/// Applies admin status changes. One backend call per change, no retry.
#[derive(Clone)]
pub struct StatusUpdater {
    backend: Arc<dyn StoreBackend>,
}

impl StatusUpdater {
    #[must_use]
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Set `order_id` to `status`.
    ///
    /// # Errors
    ///
    /// Returns `StatusUpdateError` carrying the backend's message if the
    /// change was refused or could not be sent.
    #[instrument(skip_all, fields(order_id = %order_id, status = %status))]
    pub async fn update_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), StatusUpdateError> {
        match self.backend.update_order_status(order_id, status).await {
            Ok(()) => {
                info!("Order status updated");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Order status update failed");
                Err(e.into())
            }
        }
    }
}
