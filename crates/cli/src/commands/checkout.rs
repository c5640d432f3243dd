//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! rh-cli checkout --name "রহিম উদ্দিন" --phone 01700000000 --address "মিরপুর ১০, ঢাকা"
//! ```
//!
//! Exits non-zero unless the order was placed.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use thiserror::Error;

use rojarhat_backend::{DeviceStorage, StoreBackend};
use rojarhat_core::{CustomerId, CustomerInfo};
use rojarhat_storefront::{CartStore, Checkout, OrderWriter, PlaceOrderOutcome, WritePath};

use crate::config::Context;

/// The order was not placed. Displays the shopper-facing message.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CheckoutFailed(String);

/// Place the cart as an order.
///
/// # Errors
///
/// Returns an error if the backend is not configured or the order was not placed.
pub async fn run(
    ctx: &Context,
    name: String,
    phone: String,
    address: String,
    customer_id: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Arc<dyn StoreBackend> = Arc::new(ctx.client()?);
    let storage: Arc<dyn DeviceStorage> = ctx.storage.clone();

    let checkout = Checkout::new(OrderWriter::new(
        backend,
        Arc::clone(&storage),
        ctx.storefront.checkout,
    ));
    let customer = CustomerInfo {
        name,
        phone,
        address,
        customer_id: customer_id.map(CustomerId::new),
    };

    let mut cart = CartStore::load(storage);
    let outcome = checkout.submit(&mut cart, &customer).await;

    match &outcome {
        PlaceOrderOutcome::Placed(placed) => {
            println!("{}", outcome.message());
            println!("  Order code: {}", placed.order_code);
            println!("  Order ID:   {}", placed.order_id);
            if placed.path == WritePath::Fallback {
                println!("  Note: saved without stock reservation");
            }
            if !placed.items_written {
                println!("  Note: order items could not be saved");
            }
            Ok(())
        }
        PlaceOrderOutcome::Rejected(rejection) => {
            println!("{}", rejection.message);
            for id in rejection.invalid_ids.iter().chain(&rejection.missing_ids) {
                println!("  {id}");
            }
            Err(CheckoutFailed(rejection.message.clone()).into())
        }
        PlaceOrderOutcome::Failed { message } => Err(CheckoutFailed(message.clone()).into()),
    }
}
