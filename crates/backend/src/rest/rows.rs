//! Wire shapes for the backend tables and the order procedure.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use rojarhat_core::{
    CustomerId, NewOrder, NewOrderItem, OrderId, OrderItemRecord, OrderRecord, ProductId,
};

/// Columns for the joined order read: items plus the products' current names.
pub const ORDERS_WITH_ITEMS: &str =
    "*,order_items(product_id,product_name,quantity,price,products(name))";

#[derive(Debug, Deserialize)]
pub struct IdRow<T> {
    pub id: T,
}

#[derive(Debug, Deserialize)]
pub struct OrderRow {
    pub id: OrderId,
    #[serde(default)]
    pub order_code: Option<String>,
    #[serde(default)]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub total_price: Option<Decimal>,
    #[serde(default)]
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub order_items: Vec<OrderItemRow>,
}

#[derive(Debug, Deserialize)]
pub struct OrderItemRow {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity: u32,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub products: Option<ProductNameRow>,
}

#[derive(Debug, Deserialize)]
pub struct ProductNameRow {
    #[serde(default)]
    pub name: Option<String>,
}

impl From<OrderRow> for OrderRecord {
    fn from(row: OrderRow) -> Self {
        Self {
            id: row.id,
            order_code: row.order_code,
            customer_id: row.customer_id,
            customer_name: row.customer_name.unwrap_or_default(),
            phone: row.phone,
            address: row.address,
            total_price: row.total_price.unwrap_or_default(),
            status: row.status,
            created_at: row.created_at,
            items: row
                .order_items
                .into_iter()
                .map(|item| OrderItemRecord {
                    product_id: item.product_id,
                    product_name: item.product_name,
                    catalog_name: item.products.and_then(|p| p.name),
                    quantity: item.quantity,
                    unit_price: item.price,
                })
                .collect(),
        }
    }
}

/// Row written to `orders`.
#[derive(Debug, Serialize)]
pub struct OrderInsert<'a> {
    pub order_code: &'a str,
    pub customer_id: Option<&'a CustomerId>,
    pub customer_name: &'a str,
    pub phone: &'a str,
    pub address: &'a str,
    pub total_price: Decimal,
    pub status: &'a str,
}

impl<'a> From<&'a NewOrder> for OrderInsert<'a> {
    fn from(order: &'a NewOrder) -> Self {
        Self {
            order_code: &order.order_code,
            customer_id: order.customer.customer_id.as_ref(),
            customer_name: &order.customer.name,
            phone: &order.customer.phone,
            address: &order.customer.address,
            total_price: order.total_price,
            status: order.status.as_str(),
        }
    }
}

/// Row written to `order_items`.
#[derive(Debug, Serialize)]
pub struct OrderItemInsert<'a> {
    pub order_id: &'a OrderId,
    pub product_id: &'a ProductId,
    pub product_name: &'a str,
    pub quantity: u32,
    pub price: Decimal,
}

impl<'a> OrderItemInsert<'a> {
    pub fn new(order_id: &'a OrderId, item: &'a NewOrderItem) -> Self {
        Self {
            order_id,
            product_id: &item.product_id,
            product_name: &item.product_name,
            quantity: item.quantity,
            price: item.unit_price,
        }
    }
}

/// Line item as the order procedure expects it.
#[derive(Debug, Serialize)]
pub struct ProcedureItem<'a> {
    pub product_id: &'a ProductId,
    pub product_name: &'a str,
    pub quantity: u32,
    pub price: Decimal,
}

/// Parameters of the atomic order procedure.
#[derive(Debug, Serialize)]
pub struct PlaceOrderParams<'a> {
    pub p_customer_name: &'a str,
    pub p_phone: &'a str,
    pub p_address: &'a str,
    pub p_total: Decimal,
    pub p_order_code: &'a str,
    pub p_customer_id: Option<&'a CustomerId>,
    pub p_items: Vec<ProcedureItem<'a>>,
}

impl<'a> From<&'a NewOrder> for PlaceOrderParams<'a> {
    fn from(order: &'a NewOrder) -> Self {
        Self {
            p_customer_name: &order.customer.name,
            p_phone: &order.customer.phone,
            p_address: &order.customer.address,
            p_total: order.total_price,
            p_order_code: &order.order_code,
            p_customer_id: order.customer.customer_id.as_ref(),
            p_items: order
                .items
                .iter()
                .map(|item| ProcedureItem {
                    product_id: &item.product_id,
                    product_name: &item.product_name,
                    quantity: item.quantity,
                    price: item.unit_price,
                })
                .collect(),
        }
    }
}

/// What the order procedure returns: a bare ID, a result object, or the
/// rows of a table-returning function.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum PlaceOrderResponse {
    Id(OrderId),
    Rows(Vec<PlaceOrderResult>),
    Result(PlaceOrderResult),
}

#[derive(Debug, Deserialize)]
pub struct PlaceOrderResult {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, alias = "id")]
    pub order_id: Option<OrderId>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusPatch<'a> {
    pub status: &'a str,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_joined_row_keeps_both_names() {
        let json = r#"{
            "id": "o1",
            "order_code": "RH-261019-0001",
            "customer_id": null,
            "customer_name": "Rahim",
            "phone": "01700000000",
            "address": "Dhaka",
            "total_price": 1600,
            "status": "pending",
            "created_at": "2026-10-19T08:00:00+00:00",
            "order_items": [
                {"product_id": "p1", "product_name": null, "quantity": 2, "price": 800, "products": {"name": "Panjabi"}},
                {"product_id": "p2", "product_name": "Saree", "quantity": 1, "price": 0, "products": null}
            ]
        }"#;

        let record: OrderRecord = serde_json::from_str::<OrderRow>(json).unwrap().into();

        assert_eq!(record.items.len(), 2);
        assert_eq!(record.items[0].catalog_name.as_deref(), Some("Panjabi"));
        assert_eq!(record.items[0].product_name, None);
        assert_eq!(record.items[1].catalog_name, None);
        assert_eq!(record.total_price, Decimal::from(1600));
    }

    #[test]
    fn test_flat_row_has_no_items() {
        let json = r#"{"id":"o2","customer_name":"Karim","total_price":"250.50","status":null,"created_at":"2026-10-18T10:00:00Z"}"#;
        let record: OrderRecord = serde_json::from_str::<OrderRow>(json).unwrap().into();

        assert!(record.items.is_empty());
        assert_eq!(record.status, None);
        assert_eq!(record.total_price, Decimal::new(25050, 2));
    }

    #[test]
    fn test_procedure_response_shapes() {
        let bare: PlaceOrderResponse = serde_json::from_str(r#""o-123""#).unwrap();
        assert!(matches!(bare, PlaceOrderResponse::Id(id) if id.as_str() == "o-123"));

        let object: PlaceOrderResponse =
            serde_json::from_str(r#"{"success":true,"order_id":"o-456"}"#).unwrap();
        assert!(matches!(
            object,
            PlaceOrderResponse::Result(PlaceOrderResult { order_id: Some(ref id), .. }) if id.as_str() == "o-456"
        ));

        let rows: PlaceOrderResponse =
            serde_json::from_str(r#"[{"order_id":"o-789"}]"#).unwrap();
        assert!(matches!(
            rows,
            PlaceOrderResponse::Rows(ref rows) if rows[0].order_id.as_ref().unwrap().as_str() == "o-789"
        ));

        let failure: PlaceOrderResponse =
            serde_json::from_str(r#"{"success":false,"error":"Insufficient stock"}"#).unwrap();
        assert!(matches!(
            failure,
            PlaceOrderResponse::Result(PlaceOrderResult { error: Some(_), .. })
        ));
    }
}
