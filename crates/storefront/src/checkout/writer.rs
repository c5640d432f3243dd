//! Order placement with an atomic path and a two-step fallback.
//!
//! The atomic path hands the whole order to the backend's order procedure,
//! which checks stock, inserts the order and items, and decrements stock in
//! one transaction. If that call fails cleanly (unreachable, missing or
//! refused) the writer falls back once to inserting the order row and then
//! its items. The fallback does not touch stock. A procedure that answered
//! 2xx with an unreadable body may have committed, so it never falls back.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{error, info, instrument, warn};

use rojarhat_backend::storage::{self, DeviceStorage, keys};
use rojarhat_backend::{BackendError, StorageError, StoreBackend};
use rojarhat_core::{CachedOrder, CartLine, CustomerInfo, NewOrder, OrderId, ProductId, messages};

use super::validator::{CartValidation, CartValidator};
use crate::config::CheckoutConfig;

/// Most recent orders kept in the device mirror.
pub const MIRROR_LIMIT: usize = 50;

/// Which write path produced the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePath {
    /// The order procedure ran; stock was decremented.
    Atomic,
    /// Order and items were inserted separately; stock is unchanged.
    Fallback,
}

/// A successfully written order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub order_code: String,
    pub path: WritePath,
    /// False when the fallback saved the order row but its items failed.
    pub items_written: bool,
}

/// Why a cart was refused before anything was written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartRejection {
    /// Localized message for the shopper.
    pub message: String,
    pub invalid_ids: Vec<ProductId>,
    pub missing_ids: Vec<ProductId>,
}

/// Result of a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceOrderOutcome {
    Placed(PlacedOrder),
    Rejected(CartRejection),
    /// Nothing usable was written. `message` is localized.
    Failed { message: String },
}

impl PlaceOrderOutcome {
    fn failed(message: &str) -> Self {
        Self::Failed {
            message: message.to_string(),
        }
    }

    /// The localized message to show the shopper.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Placed(_) => messages::ORDER_PLACED,
            Self::Rejected(rejection) => &rejection.message,
            Self::Failed { message } => message,
        }
    }
}

/// Writes orders to the backend and mirrors them on the device.
#[derive(Clone)]
pub struct OrderWriter {
    backend: Arc<dyn StoreBackend>,
    storage: Arc<dyn DeviceStorage>,
    validator: CartValidator,
    config: CheckoutConfig,
}

impl OrderWriter {
    #[must_use]
    pub fn new(
        backend: Arc<dyn StoreBackend>,
        storage: Arc<dyn DeviceStorage>,
        config: CheckoutConfig,
    ) -> Self {
        Self {
            validator: CartValidator::new(Arc::clone(&backend)),
            backend,
            storage,
            config,
        }
    }

    /// Validate the cart and write the order.
    ///
    /// Never returns an error: every failure is an outcome.
    #[instrument(skip_all, fields(lines = lines.len(), total = %total))]
    pub async fn place_order(
        &self,
        customer: &CustomerInfo,
        lines: &[CartLine],
        total: Decimal,
    ) -> PlaceOrderOutcome {
        if lines.is_empty() {
            return PlaceOrderOutcome::failed(messages::CART_EMPTY);
        }

        match self.validator.validate(lines).await {
            Ok(validation) if validation.is_valid() => {}
            Ok(validation) => {
                warn!(
                    invalid = ?validation.invalid_ids,
                    missing = ?validation.missing_ids,
                    "Cart rejected"
                );
                return PlaceOrderOutcome::Rejected(rejection(validation));
            }
            Err(e) => {
                warn!(error = %e, "Cart could not be verified");
                return PlaceOrderOutcome::failed(messages::CART_NOT_VERIFIED);
            }
        }

        let order = NewOrder::from_cart(
            generate_order_code(Utc::now()),
            customer.clone(),
            lines,
            total,
        );

        let items_total = order.items_total();
        if items_total != total {
            warn!(
                submitted = %total,
                computed = %items_total,
                "Order total does not match line items"
            );
            if self.config.verify_total {
                return PlaceOrderOutcome::failed(messages::ORDER_TOTAL_MISMATCH);
            }
        }

        let placed = match self.backend.place_order_atomic(&order).await {
            Ok(order_id) => {
                info!(
                    order_id = %order_id,
                    order_code = %order.order_code,
                    "Order placed atomically"
                );
                PlacedOrder {
                    order_id,
                    order_code: order.order_code.clone(),
                    path: WritePath::Atomic,
                    items_written: true,
                }
            }
            Err(e) if !starts_fallback(&e) => {
                error!(
                    error = %e,
                    order_code = %order.order_code,
                    "Order procedure may have committed; not writing a second order"
                );
                return PlaceOrderOutcome::failed(messages::ORDER_OUTCOME_UNKNOWN);
            }
            Err(e) => {
                log_atomic_failure(&e);
                match self.write_fallback(&order).await {
                    Some(placed) => placed,
                    None => return PlaceOrderOutcome::failed(messages::ORDER_NOT_SAVED),
                }
            }
        };

        self.mirror(&placed.order_id, &order);
        PlaceOrderOutcome::Placed(placed)
    }

    async fn write_fallback(&self, order: &NewOrder) -> Option<PlacedOrder> {
        let order_id = match self.backend.insert_order(order).await {
            Ok(id) => id,
            Err(e) => {
                error!(
                    error = %e,
                    order_code = %order.order_code,
                    "Fallback order insert failed"
                );
                return None;
            }
        };

        let items_written = match self.backend.insert_order_items(&order_id, &order.items).await {
            Ok(()) => true,
            Err(e) => {
                error!(
                    error = %e,
                    order_id = %order_id,
                    "Order saved without items; item insert failed"
                );
                false
            }
        };

        info!(
            order_id = %order_id,
            order_code = %order.order_code,
            items_written,
            "Order placed via fallback"
        );
        Some(PlacedOrder {
            order_id,
            order_code: order.order_code.clone(),
            path: WritePath::Fallback,
            items_written,
        })
    }

    /// Append the order to the device-local mirror, keeping the newest
    /// [`MIRROR_LIMIT`] entries.
    ///
    /// A mirror written by a newer build is left as it is.
    fn mirror(&self, order_id: &OrderId, order: &NewOrder) {
        let cached = CachedOrder::from_placed(order_id.clone(), order, Utc::now());

        let mut entries: Vec<serde_json::Value> =
            match storage::read_blob(self.storage.as_ref(), keys::ORDERS) {
                Ok(entries) => entries.unwrap_or_default(),
                Err(e @ StorageError::UnsupportedVersion { .. }) => {
                    warn!(error = %e, order_id = %order_id, "Order mirror is newer; not mirroring");
                    return;
                }
                Err(e) => {
                    warn!(error = %e, "Order mirror unreadable; starting a new one");
                    Vec::new()
                }
            };

        match serde_json::to_value(&cached) {
            Ok(value) => entries.push(value),
            Err(e) => {
                warn!(error = %e, "Failed to encode mirrored order");
                return;
            }
        }
        let excess = entries.len().saturating_sub(MIRROR_LIMIT);
        entries.drain(..excess);

        if let Err(e) = storage::write_blob(self.storage.as_ref(), keys::ORDERS, &entries) {
            warn!(error = %e, order_id = %order_id, "Failed to mirror order on device");
        }
    }
}

fn rejection(validation: CartValidation) -> CartRejection {
    let message = if validation.invalid_ids.is_empty() {
        messages::CART_UNAVAILABLE_PRODUCTS
    } else {
        messages::CART_INVALID_PRODUCTS
    };
    CartRejection {
        message: message.to_string(),
        invalid_ids: validation.invalid_ids,
        missing_ids: validation.missing_ids,
    }
}

/// Whether the atomic attempt failed without writing anything.
///
/// An unreadable or incomplete success answer means the procedure ran, so
/// a fallback insert would duplicate the order.
const fn starts_fallback(e: &BackendError) -> bool {
    !matches!(
        e,
        BackendError::OutcomeUnknown(_) | BackendError::Parse(_) | BackendError::MissingData(_)
    )
}

fn log_atomic_failure(e: &BackendError) {
    match e {
        BackendError::ProcedureMissing(name) => {
            warn!(procedure = %name, "Order procedure not deployed; using fallback");
        }
        BackendError::Rejected(reason) => {
            warn!(reason = %reason, "Order procedure refused the order; using fallback");
        }
        other => {
            warn!(
                error = %other,
                transient = other.is_transient(),
                "Atomic order failed; using fallback"
            );
        }
    }
}

/// Display code in the form `RH-YYMMDD-NNNN`.
#[must_use]
pub fn generate_order_code(now: DateTime<Utc>) -> String {
    let suffix: u16 = rand::rng().random_range(0..10_000);
    format!("RH-{}-{suffix:04}", now.format("%y%m%d"))
}
