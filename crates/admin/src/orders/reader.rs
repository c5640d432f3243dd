//! Order retrieval with tiered fallback.
//!
//! | Tier | Source | Items |
//! |------|--------|-------|
//! | 1 | Orders joined with items and catalog names | Yes |
//! | 2 | Order rows only | No |
//! | 3 | Device-local mirror of placed orders | As mirrored |
//!
//! The first tier that answers wins, even with an empty list. Only when all
//! three fail does the reader return [`AdminError::OrdersUnavailable`].

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use rojarhat_backend::storage::{self, keys};
use rojarhat_backend::{DeviceStorage, StoreBackend};
use rojarhat_core::{CachedOrder, CustomerId, Order};

use crate::error::AdminError;

/// Which source produced an order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderSource {
    Joined,
    Flat,
    LocalMirror,
}

impl OrderSource {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Joined => "joined",
            Self::Flat => "flat",
            Self::LocalMirror => "local mirror",
        }
    }
}

/// Reads orders for the admin.
#[derive(Clone)]
pub struct OrderReader {
    backend: Arc<dyn StoreBackend>,
    storage: Arc<dyn DeviceStorage>,
}

impl OrderReader {
    #[must_use]
    pub fn new(backend: Arc<dyn StoreBackend>, storage: Arc<dyn DeviceStorage>) -> Self {
        Self { backend, storage }
    }

    /// List orders, newest first, optionally for one customer.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::OrdersUnavailable` if every source failed.
    pub async fn list_orders(
        &self,
        customer: Option<&CustomerId>,
    ) -> Result<Vec<Order>, AdminError> {
        self.list_orders_with_source(customer)
            .await
            .map(|(orders, _)| orders)
    }

    /// Like [`list_orders`](Self::list_orders), also reporting which source answered.
    ///
    /// # Errors
    ///
    /// Returns `AdminError::OrdersUnavailable` if every source failed.
    #[instrument(skip_all, fields(customer = ?customer))]
    pub async fn list_orders_with_source(
        &self,
        customer: Option<&CustomerId>,
    ) -> Result<(Vec<Order>, OrderSource), AdminError> {
        let (mut orders, source) = self.fetch().await?;

        if let Some(customer) = customer {
            orders.retain(|order| order.customer_id.as_ref() == Some(customer));
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        info!(count = orders.len(), source = source.as_str(), "Orders loaded");
        Ok((orders, source))
    }

    async fn fetch(&self) -> Result<(Vec<Order>, OrderSource), AdminError> {
        match self.backend.list_orders_with_items().await {
            Ok(records) => {
                return Ok((
                    records.into_iter().map(Order::from).collect(),
                    OrderSource::Joined,
                ));
            }
            Err(e) => warn!(tier = OrderSource::Joined.as_str(), error = %e, "Order tier failed"),
        }

        match self.backend.list_orders().await {
            Ok(records) => {
                return Ok((
                    records.into_iter().map(Order::from).collect(),
                    OrderSource::Flat,
                ));
            }
            Err(e) => warn!(tier = OrderSource::Flat.as_str(), error = %e, "Order tier failed"),
        }

        match self.read_mirror() {
            Ok(orders) => Ok((orders, OrderSource::LocalMirror)),
            Err(last_error) => {
                error!(error = %last_error, "All order sources failed");
                Err(AdminError::OrdersUnavailable { last_error })
            }
        }
    }

    /// Mirror entries are decoded one by one; bad entries are skipped.
    fn read_mirror(&self) -> Result<Vec<Order>, String> {
        let entries: Vec<serde_json::Value> =
            match storage::read_blob(self.storage.as_ref(), keys::ORDERS) {
                Ok(Some(entries)) => entries,
                Ok(None) => return Err("order mirror is absent".to_string()),
                Err(e) => return Err(format!("order mirror is unreadable: {e}")),
            };

        let orders: Vec<Order> = entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<CachedOrder>(entry) {
                Ok(cached) => Some(Order::from(cached)),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed mirrored order");
                    None
                }
            })
            .collect();

        if orders.is_empty() {
            return Err("order mirror is empty".to_string());
        }
        warn!(
            tier = OrderSource::LocalMirror.as_str(),
            count = orders.len(),
            "Serving orders from device mirror"
        );
        Ok(orders)
    }
}
