//! Order domain types.
//!
//! Three shapes of order exist:
//!
//! - [`NewOrder`] - what the storefront submits, built from a cart snapshot
//! - [`OrderRecord`] - what the backend returns, with raw join data
//! - [`Order`] - what the admin displays, with item names resolved
//!
//! [`CachedOrder`] is the device-local mirror of placed orders. It is read
//! only when the backend is unreachable, so every field except the ID is
//! optional and defaulted on the way to [`Order`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::CartLine;
use super::id::{CustomerId, OrderId, ProductId};
use super::status::OrderStatus;
use crate::messages;

/// Contact details collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub address: String,
    /// Registered customer, if the shopper is signed in.
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
}

/// An order ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrder {
    /// Human-facing display code (e.g., "RH-261019-4821").
    pub order_code: String,
    pub customer: CustomerInfo,
    /// Caller-computed total. Stored as given.
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Build an order from a cart snapshot.
    #[must_use]
    pub fn from_cart(
        order_code: String,
        customer: CustomerInfo,
        lines: &[CartLine],
        total_price: Decimal,
    ) -> Self {
        Self {
            order_code,
            customer,
            total_price,
            status: OrderStatus::Pending,
            items: lines.iter().map(NewOrderItem::from).collect(),
        }
    }

    /// Sum of unit price times quantity over all items.
    #[must_use]
    pub fn items_total(&self) -> Decimal {
        self.items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum()
    }
}

/// A line item ready to be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    /// Denormalized product name, kept even if the product is later deleted.
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl From<&CartLine> for NewOrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            product_name: line.name.clone(),
            quantity: line.quantity,
            unit_price: line.unit_price,
        }
    }
}

/// An order as displayed in the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub order_code: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    /// Empty when items could not be loaded.
    pub items: Vec<OrderItem>,
}

/// A line item of an [`Order`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

/// An order row as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRecord {
    pub id: OrderId,
    pub order_code: Option<String>,
    pub customer_id: Option<CustomerId>,
    pub customer_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub total_price: Decimal,
    /// Raw status column.
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemRecord>,
}

/// A line item row as returned by the backend, with joined catalog data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemRecord {
    pub product_id: ProductId,
    /// Name snapshot stored on the item row.
    pub product_name: Option<String>,
    /// Name from the joined products row. `None` if the product was deleted.
    pub catalog_name: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl OrderItemRecord {
    /// Display name: snapshot, then catalog name, then an ID-derived placeholder.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.product_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| self.catalog_name.as_deref())
            .map_or_else(
                || messages::unknown_product(self.product_id.short()),
                str::to_owned,
            )
    }
}

impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        let items = record
            .items
            .iter()
            .map(|item| OrderItem {
                order_id: record.id.clone(),
                product_id: item.product_id.clone(),
                product_name: item.display_name(),
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();

        Self {
            status: OrderStatus::from_stored(record.status.as_deref()),
            id: record.id,
            order_code: record.order_code,
            customer_id: record.customer_id,
            customer_name: record.customer_name,
            phone: record.phone.unwrap_or_default(),
            address: record.address.unwrap_or_default(),
            total_price: record.total_price,
            created_at: record.created_at,
            items,
        }
    }
}

/// Device-local mirror of a placed order.
///
/// Accepts both the `snake_case` fields this crate writes and the
/// `camelCase` fields of older mirrors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedOrder {
    pub id: OrderId,
    #[serde(default, alias = "orderCode", alias = "orderId")]
    pub order_code: Option<String>,
    #[serde(default, alias = "customerId")]
    pub customer_id: Option<CustomerId>,
    #[serde(default, alias = "customerName")]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "totalPrice", alias = "total")]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub items: Vec<CachedOrderItem>,
}

/// Device-local mirror of an order line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedOrderItem {
    #[serde(alias = "productId")]
    pub product_id: ProductId,
    #[serde(default, alias = "productName", alias = "name")]
    pub product_name: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default, alias = "unitPrice", alias = "price")]
    pub unit_price: Decimal,
}

const fn default_quantity() -> u32 {
    1
}

impl CachedOrder {
    /// Mirror record for an order that was just written.
    #[must_use]
    pub fn from_placed(order_id: OrderId, order: &NewOrder, created_at: DateTime<Utc>) -> Self {
        Self {
            id: order_id,
            order_code: Some(order.order_code.clone()),
            customer_id: order.customer.customer_id.clone(),
            customer_name: Some(order.customer.name.clone()),
            phone: Some(order.customer.phone.clone()),
            address: Some(order.customer.address.clone()),
            total_price: Some(order.total_price),
            status: Some(order.status.to_string()),
            created_at: Some(created_at),
            items: order
                .items
                .iter()
                .map(|item| CachedOrderItem {
                    product_id: item.product_id.clone(),
                    product_name: Some(item.product_name.clone()),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                })
                .collect(),
        }
    }
}

impl From<CachedOrder> for Order {
    fn from(cached: CachedOrder) -> Self {
        let items = cached
            .items
            .into_iter()
            .map(|item| {
                let product_name = item
                    .product_name
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| messages::unknown_product(item.product_id.short()));
                OrderItem {
                    order_id: cached.id.clone(),
                    product_id: item.product_id,
                    product_name,
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                }
            })
            .collect();

        Self {
            status: OrderStatus::from_stored(cached.status.as_deref()),
            id: cached.id,
            order_code: cached.order_code,
            customer_id: cached.customer_id,
            customer_name: cached.customer_name.unwrap_or_default(),
            phone: cached.phone.unwrap_or_default(),
            address: cached.address.unwrap_or_default(),
            total_price: cached.total_price.unwrap_or_default(),
            created_at: cached.created_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
            items,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item_record(name: Option<&str>, catalog: Option<&str>) -> OrderItemRecord {
        OrderItemRecord {
            product_id: ProductId::new("3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b"),
            product_name: name.map(String::from),
            catalog_name: catalog.map(String::from),
            quantity: 1,
            unit_price: Decimal::new(500, 0),
        }
    }

    #[test]
    fn test_display_name_prefers_snapshot() {
        assert_eq!(
            item_record(Some("লাল শাড়ি"), Some("শাড়ি")).display_name(),
            "লাল শাড়ি"
        );
    }

    #[test]
    fn test_display_name_falls_back_to_catalog() {
        assert_eq!(item_record(None, Some("শাড়ি")).display_name(), "শাড়ি");
        assert_eq!(item_record(Some("  "), Some("শাড়ি")).display_name(), "শাড়ি");
    }

    #[test]
    fn test_display_name_placeholder_for_deleted_product() {
        assert_eq!(item_record(None, None).display_name(), "পণ্য #3f2b8c1e");
    }

    #[test]
    fn test_cached_order_defaults_missing_fields() {
        let cached: CachedOrder = serde_json::from_str(r#"{"id":"local-1"}"#).unwrap();
        let order = Order::from(cached);

        assert_eq!(order.phone, "");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_price, Decimal::ZERO);
        assert_eq!(order.created_at, DateTime::<Utc>::UNIX_EPOCH);
        assert!(order.items.is_empty());
    }

    #[test]
    fn test_cached_order_reads_camel_case() {
        let json = r#"{
            "id": "local-2",
            "customerName": "রহিম",
            "totalPrice": 1500,
            "status": "delivered",
            "createdAt": "2026-10-01T08:30:00Z",
            "items": [{"productId": "p-1", "name": "Panjabi", "quantity": 2, "price": 750}]
        }"#;
        let order = Order::from(serde_json::from_str::<CachedOrder>(json).unwrap());

        assert_eq!(order.customer_name, "রহিম");
        assert_eq!(order.total_price, Decimal::new(1500, 0));
        assert_eq!(order.status, OrderStatus::Delivered);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_name, "Panjabi");
        assert_eq!(order.items[0].order_id.as_str(), "local-2");
    }

    #[test]
    fn test_new_order_items_total() {
        let lines = vec![
            CartLine {
                product_id: ProductId::new("a"),
                name: "A".into(),
                unit_price: Decimal::new(100, 0),
                quantity: 2,
            },
            CartLine {
                product_id: ProductId::new("b"),
                name: "B".into(),
                unit_price: Decimal::new(2550, 2),
                quantity: 1,
            },
        ];
        let customer = CustomerInfo {
            name: "করিম".into(),
            phone: "01700000000".into(),
            address: "ঢাকা".into(),
            customer_id: None,
        };
        let order = NewOrder::from_cart("RH-1".into(), customer, &lines, Decimal::new(999, 0));

        assert_eq!(order.items_total(), Decimal::new(22550, 2));
        // Caller total is kept verbatim
        assert_eq!(order.total_price, Decimal::new(999, 0));
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_record_into_order_resolves_names() {
        let record = OrderRecord {
            id: OrderId::new("o-1"),
            order_code: None,
            customer_id: None,
            customer_name: "Rina".into(),
            phone: None,
            address: Some("Khulna".into()),
            total_price: Decimal::new(500, 0),
            status: Some("processing".into()),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
            items: vec![item_record(None, None)],
        };
        let order = Order::from(record);

        assert_eq!(order.status, OrderStatus::Processing);
        assert_eq!(order.phone, "");
        assert_eq!(order.items[0].product_name, "পণ্য #3f2b8c1e");
        assert_eq!(order.items[0].order_id.as_str(), "o-1");
    }
}
