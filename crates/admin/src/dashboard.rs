//! Admin dashboard snapshot.
//!
//! Products, categories, orders and customers are fetched concurrently. A
//! resource that fails to load contributes an empty list and is named in
//! [`DashboardSnapshot::failed`]; the rest of the dashboard still renders.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{instrument, warn};

use rojarhat_backend::StoreBackend;
use rojarhat_core::stats::{InventorySummary, SalesSummary, category_product_counts};
use rojarhat_core::{Category, Customer, Order, Product};

use crate::orders::OrderReader;

/// Resources shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Products,
    Categories,
    Orders,
    Customers,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Products => "products",
            Self::Categories => "categories",
            Self::Orders => "orders",
            Self::Customers => "customers",
        })
    }
}

/// Everything the dashboard shows, computed from one fetch.
#[derive(Debug, Clone)]
pub struct DashboardSnapshot {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
    pub orders: Vec<Order>,
    pub customers: Vec<Customer>,
    pub sales: SalesSummary,
    pub inventory: InventorySummary,
    /// Product count per declared category, empty categories included.
    pub category_counts: Vec<(Category, usize)>,
    /// Resources that failed to load and are shown empty.
    pub failed: Vec<Resource>,
}

impl DashboardSnapshot {
    /// Build a snapshot from already-fetched data.
    #[must_use]
    pub fn compute(
        products: Vec<Product>,
        categories: Vec<Category>,
        orders: Vec<Order>,
        customers: Vec<Customer>,
        now: &DateTime<Local>,
    ) -> Self {
        Self {
            sales: SalesSummary::from_orders(&orders, now),
            inventory: InventorySummary::from_products(&products),
            category_counts: category_product_counts(&categories, &products),
            products,
            categories,
            orders,
            customers,
            failed: Vec::new(),
        }
    }

    /// Whether every resource loaded.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

fn or_empty<T, E: std::fmt::Display>(
    result: Result<Vec<T>, E>,
    resource: Resource,
    failed: &mut Vec<Resource>,
) -> Vec<T> {
    result.unwrap_or_else(|e| {
        warn!(resource = %resource, error = %e, "Dashboard resource failed to load");
        failed.push(resource);
        Vec::new()
    })
}

/// Fetch all dashboard resources concurrently and compute the summaries.
///
/// Orders come through `reader`, so they get the same fallback tiers as the
/// order list. "Today" is the local calendar date.
#[instrument(skip_all)]
pub async fn load_dashboard(
    backend: &Arc<dyn StoreBackend>,
    reader: &OrderReader,
) -> DashboardSnapshot {
    let (products, categories, orders, customers) = tokio::join!(
        backend.list_products(),
        backend.list_categories(),
        reader.list_orders(None),
        backend.list_customers(),
    );

    let mut failed = Vec::new();
    let products = or_empty(products, Resource::Products, &mut failed);
    let categories = or_empty(categories, Resource::Categories, &mut failed);
    let orders = or_empty(orders, Resource::Orders, &mut failed);
    let customers = or_empty(customers, Resource::Customers, &mut failed);

    let mut snapshot =
        DashboardSnapshot::compute(products, categories, orders, customers, &Local::now());
    snapshot.failed = failed;
    snapshot
}
