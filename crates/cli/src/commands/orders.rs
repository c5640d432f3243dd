//! Order management commands.
//!
//! # Usage
//!
//! ```bash
//! rh-cli orders list --customer 9b1c...
//! rh-cli orders status 5e0f... delivered
//! rh-cli orders watch --interval 10
//! ```

#![allow(clippy::print_stdout)]

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use rojarhat_admin::{OrderReader, OrderSource, StatusUpdater, poll_order_changes, watch_orders};
use rojarhat_backend::{ChangeHub, DeviceStorage, StoreBackend};
use rojarhat_core::{CustomerId, Order, OrderId, OrderStatus, Price, messages};

use crate::config::Context;

type Handles = (Arc<dyn StoreBackend>, OrderReader);

fn reader(ctx: &Context) -> Result<Handles, Box<dyn std::error::Error>> {
    let backend: Arc<dyn StoreBackend> = Arc::new(ctx.client()?);
    let storage: Arc<dyn DeviceStorage> = ctx.storage.clone();
    let reader = OrderReader::new(Arc::clone(&backend), storage);
    Ok((backend, reader))
}

/// List orders, newest first.
///
/// # Errors
///
/// Returns an error if the backend is not configured or no order source answered.
pub async fn list(
    ctx: &Context,
    customer: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, reader) = reader(ctx)?;
    let customer = customer.map(CustomerId::new);

    let (orders, source) = reader.list_orders_with_source(customer.as_ref()).await?;
    if source == OrderSource::LocalMirror {
        println!("(showing orders saved on this device; the backend is unreachable)");
    }
    print_orders(&orders);
    Ok(())
}

/// Change an order's status.
///
/// # Errors
///
/// Returns an error if the status is unknown or the backend refused the change.
pub async fn set_status(
    ctx: &Context,
    order_id: &str,
    status: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    // Parse before touching the backend
    let status: OrderStatus = status.parse()?;
    let (backend, _) = reader(ctx)?;

    StatusUpdater::new(backend)
        .update_status(&OrderId::new(order_id), status)
        .await
        .map_err(|e| format!("{}: {e}", messages::STATUS_NOT_UPDATED))?;

    println!("Order {order_id} is now {status}");
    Ok(())
}

/// Print the order list every time it changes.
///
/// The hosted backend's realtime transport is not wired into the CLI, so
/// changes are detected by polling the order rows every `interval`. A failed
/// poll is printed once and polling continues.
///
/// # Errors
///
/// Returns an error if the backend is not configured.
pub async fn watch(ctx: &Context, interval: Duration) -> Result<(), Box<dyn std::error::Error>> {
    let (backend, reader) = reader(ctx)?;
    let hub = ChangeHub::default();
    let (tx, mut rx) = mpsc::channel(8);

    match reader.list_orders(None).await {
        Ok(orders) => print_orders(&orders),
        Err(e) => println!("{e}"),
    }

    let poller = poll_order_changes(backend.as_ref(), &hub, interval, tx.clone());
    let watcher = watch_orders(&reader, &hub, tx);
    let printer = async {
        while let Some(result) = rx.recv().await {
            match result {
                Ok(orders) => print_orders(&orders),
                Err(e) => println!("{e}"),
            }
        }
    };

    tokio::select! {
        _ = async { tokio::join!(poller, watcher, printer) } => {}
        _ = tokio::signal::ctrl_c() => tracing::info!("Interrupted"),
    }

    Ok(())
}

fn print_orders(orders: &[Order]) {
    if orders.is_empty() {
        println!("No orders");
        return;
    }
    for order in orders {
        println!(
            "{}  {:<16} {:<10} {:>12}  {}  {}",
            order.created_at.format("%Y-%m-%d %H:%M"),
            order.order_code.as_deref().unwrap_or("-"),
            order.status,
            Price::taka(order.total_price),
            order.customer_name,
            order.id,
        );
        for item in &order.items {
            println!(
                "    {} x {} @ {}",
                item.quantity,
                item.product_name,
                Price::taka(item.unit_price)
            );
        }
    }
    println!("{} orders", orders.len());
}
