//! Checkout: cart validation and order placement.
//!
//! - [`validator`] - Checks that every cart line names a real product
//! - [`writer`] - Writes the order (atomic procedure, then fallback) and
//!   mirrors it on the device

pub mod validator;
pub mod writer;

pub use validator::{CartValidation, CartValidator};
pub use writer::{
    CartRejection, OrderWriter, PlaceOrderOutcome, PlacedOrder, WritePath, generate_order_code,
};

use rojarhat_backend::DeviceStorage;
use rojarhat_core::CustomerInfo;
use tracing::instrument;

use crate::cart::CartStore;

/// Places the cart's contents as an order.
#[derive(Clone)]
pub struct Checkout {
    writer: OrderWriter,
}

impl Checkout {
    #[must_use]
    pub const fn new(writer: OrderWriter) -> Self {
        Self { writer }
    }

    /// Submit the cart with its computed total.
    ///
    /// The cart is cleared only when the order was placed.
    #[instrument(skip_all, fields(lines = cart.line_count()))]
    pub async fn submit<S: DeviceStorage>(
        &self,
        cart: &mut CartStore<S>,
        customer: &CustomerInfo,
    ) -> PlaceOrderOutcome {
        let outcome = self
            .writer
            .place_order(customer, cart.lines(), cart.total())
            .await;

        if matches!(outcome, PlaceOrderOutcome::Placed(_)) {
            cart.clear();
        }
        outcome
    }
}
