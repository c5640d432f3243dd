//! In-process backend with fault injection.
//!
//! Mirrors the hosted backend's tables in memory, records every call, and
//! can be told to fail individual operations. Used by the integration tests.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use rojarhat_core::{
    Category, CategoryId, Customer, CustomerId, NewOrder, NewOrderItem, OrderId, OrderItemRecord,
    OrderRecord, OrderStatus, Product, ProductId,
};

use crate::error::BackendError;
use crate::realtime::{ChangeFeed, ChangeHub, ChangeKind, Subscription};
use crate::store::StoreBackend;

/// Operations that can be made to fail.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Faults {
    /// The order procedure is not deployed.
    pub rpc_missing: bool,
    /// The order procedure call fails in transit.
    pub rpc_unavailable: bool,
    /// The order procedure commits, but its answer is lost.
    pub rpc_unreadable: bool,
    pub order_insert: bool,
    pub item_insert: bool,
    pub joined_read: bool,
    pub flat_read: bool,
    pub product_lookup: bool,
    pub status_update: bool,
    /// Products, categories and customers reads.
    pub catalog_read: bool,
}

/// A call made against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    ExistingProducts(Vec<ProductId>),
    PlaceOrderAtomic,
    InsertOrder,
    InsertOrderItems(usize),
    ListOrdersWithItems,
    ListOrders,
    UpdateStatus(OrderId, OrderStatus),
    ListProducts,
    ListCategories,
    ListCustomers,
}

#[derive(Debug, Default)]
struct State {
    products: Vec<Product>,
    categories: Vec<Category>,
    customers: Vec<Customer>,
    orders: Vec<OrderRecord>,
    faults: Faults,
    calls: Vec<BackendCall>,
}

/// Backend held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
    hub: ChangeHub,
}

fn unavailable(operation: &str) -> BackendError {
    BackendError::Unavailable(format!("{operation} failed (injected)"))
}

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend seeded with `products`.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let backend = Self::new();
        backend.lock().products = products;
        backend
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_product(&self, product: Product) {
        self.lock().products.push(product);
        self.hub.publish("products", ChangeKind::Insert);
    }

    pub fn add_category(&self, name: &str) -> CategoryId {
        let id = CategoryId::new(Uuid::new_v4().to_string());
        self.lock().categories.push(Category {
            id: id.clone(),
            name: name.to_string(),
        });
        id
    }

    pub fn add_customer(&self, name: &str, phone: Option<&str>) -> CustomerId {
        let id = CustomerId::new(Uuid::new_v4().to_string());
        self.lock().customers.push(Customer {
            id: id.clone(),
            name: name.to_string(),
            phone: phone.map(String::from),
            created_at: Some(Utc::now()),
        });
        id
    }

    /// Insert an order row directly, bypassing stock checks.
    pub fn seed_order(&self, order: OrderRecord) {
        self.lock().orders.push(order);
    }

    /// Remove a product, leaving any order items that reference it.
    pub fn delete_product(&self, id: &ProductId) {
        self.lock().products.retain(|p| &p.id != id);
        self.hub.publish("products", ChangeKind::Delete);
    }

    /// Change which operations fail.
    pub fn update_faults(&self, f: impl FnOnce(&mut Faults)) {
        f(&mut self.lock().faults);
    }

    /// Calls made so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<BackendCall> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn product(&self, id: &ProductId) -> Option<Product> {
        self.lock().products.iter().find(|p| &p.id == id).cloned()
    }

    #[must_use]
    pub fn order_count(&self) -> usize {
        self.lock().orders.len()
    }

    #[must_use]
    pub fn order(&self, id: &OrderId) -> Option<OrderRecord> {
        self.lock().orders.iter().find(|o| &o.id == id).cloned()
    }

    /// Items stored for an order.
    #[must_use]
    pub fn items_for(&self, order_id: &OrderId) -> Vec<OrderItemRecord> {
        self.order(order_id).map(|o| o.items).unwrap_or_default()
    }

    /// The change feed this backend publishes to.
    #[must_use]
    pub const fn feed(&self) -> &ChangeHub {
        &self.hub
    }

    fn record(&self, call: BackendCall) -> Faults {
        let mut state = self.lock();
        state.calls.push(call);
        state.faults
    }

    fn order_row(id: OrderId, order: &NewOrder) -> OrderRecord {
        OrderRecord {
            id,
            order_code: Some(order.order_code.clone()),
            customer_id: order.customer.customer_id.clone(),
            customer_name: order.customer.name.clone(),
            phone: Some(order.customer.phone.clone()),
            address: Some(order.customer.address.clone()),
            total_price: order.total_price,
            status: Some(order.status.as_str().to_string()),
            created_at: Utc::now(),
            items: Vec::new(),
        }
    }

    fn item_row(item: &NewOrderItem) -> OrderItemRecord {
        OrderItemRecord {
            product_id: item.product_id.clone(),
            product_name: Some(item.product_name.clone()),
            catalog_name: None,
            quantity: item.quantity,
            unit_price: item.unit_price,
        }
    }

    /// Attach current catalog names the way the joined read does.
    fn joined(state: &State, mut record: OrderRecord) -> OrderRecord {
        for item in &mut record.items {
            item.catalog_name = state
                .products
                .iter()
                .find(|p| p.id == item.product_id)
                .map(|p| p.name.clone());
        }
        record
    }

    fn sorted(mut records: Vec<OrderRecord>) -> Vec<OrderRecord> {
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records
    }
}

#[async_trait]
impl StoreBackend for MemoryBackend {
    async fn existing_product_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashSet<ProductId>, BackendError> {
        let faults = self.record(BackendCall::ExistingProducts(ids.to_vec()));
        if faults.product_lookup {
            return Err(unavailable("product lookup"));
        }
        let state = self.lock();
        Ok(ids
            .iter()
            .filter(|id| state.products.iter().any(|p| &p.id == *id))
            .cloned()
            .collect())
    }

    async fn place_order_atomic(&self, order: &NewOrder) -> Result<OrderId, BackendError> {
        let faults = self.record(BackendCall::PlaceOrderAtomic);
        if faults.rpc_missing {
            return Err(BackendError::ProcedureMissing("place_order".to_string()));
        }
        if faults.rpc_unavailable {
            return Err(unavailable("order procedure"));
        }

        let id = {
            let mut state = self.lock();

            for item in &order.items {
                let product = state
                    .products
                    .iter()
                    .find(|p| p.id == item.product_id)
                    .ok_or_else(|| {
                        BackendError::Rejected(format!("Product {} not found", item.product_id))
                    })?;
                if i64::from(product.stock) < i64::from(item.quantity) {
                    return Err(BackendError::Rejected(format!(
                        "Insufficient stock for {}",
                        product.name
                    )));
                }
            }

            for item in &order.items {
                if let Some(product) = state.products.iter_mut().find(|p| p.id == item.product_id)
                {
                    product.stock -= i32::try_from(item.quantity).unwrap_or(i32::MAX);
                }
            }

            let id = OrderId::new(Uuid::new_v4().to_string());
            let mut row = Self::order_row(id.clone(), order);
            row.items = order.items.iter().map(Self::item_row).collect();
            state.orders.push(row);
            id
        };

        self.hub.publish("orders", ChangeKind::Insert);
        self.hub.publish("products", ChangeKind::Update);
        if faults.rpc_unreadable {
            return Err(BackendError::OutcomeUnknown(format!(
                "order procedure answer lost (injected) for {id}"
            )));
        }
        Ok(id)
    }

    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, BackendError> {
        let faults = self.record(BackendCall::InsertOrder);
        if faults.order_insert {
            return Err(unavailable("order insert"));
        }
        let id = OrderId::new(Uuid::new_v4().to_string());
        self.lock().orders.push(Self::order_row(id.clone(), order));
        self.hub.publish("orders", ChangeKind::Insert);
        Ok(id)
    }

    async fn insert_order_items(
        &self,
        order_id: &OrderId,
        items: &[NewOrderItem],
    ) -> Result<(), BackendError> {
        let faults = self.record(BackendCall::InsertOrderItems(items.len()));
        if faults.item_insert {
            return Err(unavailable("order item insert"));
        }
        let mut state = self.lock();
        let order = state
            .orders
            .iter_mut()
            .find(|o| &o.id == order_id)
            .ok_or_else(|| BackendError::NotFound(format!("order {order_id}")))?;
        order.items.extend(items.iter().map(Self::item_row));
        Ok(())
    }

    async fn list_orders_with_items(&self) -> Result<Vec<OrderRecord>, BackendError> {
        let faults = self.record(BackendCall::ListOrdersWithItems);
        if faults.joined_read {
            return Err(unavailable("joined order read"));
        }
        let state = self.lock();
        let records = state
            .orders
            .iter()
            .cloned()
            .map(|record| Self::joined(&state, record))
            .collect();
        Ok(Self::sorted(records))
    }

    async fn list_orders(&self) -> Result<Vec<OrderRecord>, BackendError> {
        let faults = self.record(BackendCall::ListOrders);
        if faults.flat_read {
            return Err(unavailable("order read"));
        }
        let records = self
            .lock()
            .orders
            .iter()
            .cloned()
            .map(|mut record| {
                record.items.clear();
                record
            })
            .collect();
        Ok(Self::sorted(records))
    }

    async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError> {
        let faults = self.record(BackendCall::UpdateStatus(order_id.clone(), status));
        if faults.status_update {
            return Err(BackendError::Api {
                status: 403,
                code: Some("42501".to_string()),
                message: "permission denied for table orders".to_string(),
            });
        }
        {
            let mut state = self.lock();
            let order = state
                .orders
                .iter_mut()
                .find(|o| &o.id == order_id)
                .ok_or_else(|| BackendError::NotFound(format!("order {order_id}")))?;
            order.status = Some(status.as_str().to_string());
        }
        self.hub.publish("orders", ChangeKind::Update);
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        let faults = self.record(BackendCall::ListProducts);
        if faults.catalog_read {
            return Err(unavailable("product read"));
        }
        Ok(self.lock().products.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        let faults = self.record(BackendCall::ListCategories);
        if faults.catalog_read {
            return Err(unavailable("category read"));
        }
        Ok(self.lock().categories.clone())
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, BackendError> {
        let faults = self.record(BackendCall::ListCustomers);
        if faults.catalog_read {
            return Err(unavailable("customer read"));
        }
        Ok(self.lock().customers.clone())
    }
}

impl ChangeFeed for MemoryBackend {
    fn subscribe(&self, table: &str) -> Subscription {
        self.hub.subscribe(table)
    }
}
