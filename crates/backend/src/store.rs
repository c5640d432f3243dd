//! The backend port used by the storefront and the admin.
//!
//! Each method is one round trip to the hosted backend. Fallback policy
//! (which call to try next when one fails) belongs to the callers, not to
//! implementations of this trait.

use std::collections::HashSet;

use async_trait::async_trait;

use rojarhat_core::{
    Category, Customer, NewOrder, NewOrderItem, OrderId, OrderRecord, OrderStatus, Product,
    ProductId,
};

use crate::error::BackendError;

/// Operations the order pipeline needs from the hosted backend.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Return the subset of `ids` that exist in the products table.
    ///
    /// One batched query (`SELECT id FROM products WHERE id IN (...)`).
    async fn existing_product_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashSet<ProductId>, BackendError>;

    /// Run the atomic order procedure: check stock, insert the order,
    /// decrement stock and insert all items in one transaction.
    async fn place_order_atomic(&self, order: &NewOrder) -> Result<OrderId, BackendError>;

    /// Insert the order row alone.
    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, BackendError>;

    /// Insert line items for an existing order.
    async fn insert_order_items(
        &self,
        order_id: &OrderId,
        items: &[NewOrderItem],
    ) -> Result<(), BackendError>;

    /// Orders joined with their items and the items' catalog names.
    async fn list_orders_with_items(&self) -> Result<Vec<OrderRecord>, BackendError>;

    /// Order rows only. Every record has an empty `items` list.
    async fn list_orders(&self) -> Result<Vec<OrderRecord>, BackendError>;

    /// Set an order's status.
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError>;

    /// All products.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// All categories.
    async fn list_categories(&self) -> Result<Vec<Category>, BackendError>;

    /// All registered customers.
    async fn list_customers(&self) -> Result<Vec<Customer>, BackendError>;
}
