//! Dashboard command.

#![allow(clippy::print_stdout)]

use std::sync::Arc;

use rojarhat_admin::{DashboardSnapshot, OrderReader, load_dashboard};
use rojarhat_backend::{DeviceStorage, StoreBackend};
use rojarhat_core::stats::LOW_STOCK_THRESHOLD;
use rojarhat_core::{OrderStatus, Price};

use crate::config::Context;

/// Print sales, inventory and category summaries.
///
/// # Errors
///
/// Returns an error if the backend is not configured. Resources that fail to
/// load are reported and shown empty.
pub async fn run(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let backend: Arc<dyn StoreBackend> = Arc::new(ctx.client()?);
    let storage: Arc<dyn DeviceStorage> = ctx.storage.clone();
    let reader = OrderReader::new(Arc::clone(&backend), storage);

    let snapshot = load_dashboard(&backend, &reader).await;
    print_snapshot(&snapshot);
    Ok(())
}

fn print_snapshot(snapshot: &DashboardSnapshot) {
    for resource in &snapshot.failed {
        println!("! Could not load {resource}");
    }

    let sales = &snapshot.sales;
    println!("Sales");
    println!("  Orders:          {}", sales.order_count);
    println!("  Revenue:         {}", Price::taka(sales.total_revenue));
    println!("  Average order:   {}", Price::taka(sales.average_order_value));
    println!(
        "  Today:           {} orders, {}",
        sales.today_order_count,
        Price::taka(sales.today_revenue)
    );
    for status in OrderStatus::ALL {
        println!("  {status:<16} {}", sales.by_status.get(status));
    }

    let inventory = &snapshot.inventory;
    println!("Inventory");
    println!("  Products:        {}", inventory.product_count);
    println!("  Units in stock:  {}", inventory.total_units);
    println!(
        "  Low stock (<{LOW_STOCK_THRESHOLD}): {}",
        inventory.low_stock
    );
    println!("  Out of stock:    {}", inventory.out_of_stock);

    println!("Categories");
    for (category, count) in &snapshot.category_counts {
        println!("  {:<24} {count}", category.name);
    }

    println!("Customers: {}", snapshot.customers.len());
}
