//! [`StoreBackend`] over the REST client.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::instrument;

use rojarhat_core::{
    Category, Customer, NewOrder, NewOrderItem, OrderId, OrderRecord, OrderStatus, Product,
    ProductId,
};

use super::RestClient;
use super::rows::{
    IdRow, ORDERS_WITH_ITEMS, OrderInsert, OrderItemInsert, OrderRow, PlaceOrderParams,
    PlaceOrderResponse, PlaceOrderResult, StatusPatch,
};
use crate::error::BackendError;
use crate::store::StoreBackend;

#[async_trait]
impl StoreBackend for RestClient {
    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn existing_product_ids(
        &self,
        ids: &[ProductId],
    ) -> Result<HashSet<ProductId>, BackendError> {
        if ids.is_empty() {
            return Ok(HashSet::new());
        }
        let rows: Vec<IdRow<ProductId>> = self
            .from("products")
            .select("id")
            .in_list("id", ids.iter().map(ProductId::as_str))
            .fetch()
            .await?;
        Ok(rows.into_iter().map(|row| row.id).collect())
    }

    #[instrument(skip(self, order), fields(order_code = %order.order_code))]
    async fn place_order_atomic(&self, order: &NewOrder) -> Result<OrderId, BackendError> {
        let params = PlaceOrderParams::from(order);

        // A 2xx answer means the procedure ran, so anything unreadable past
        // this point is reported as an unknown outcome, never a plain failure.
        let response: PlaceOrderResponse = match self.rpc(self.order_rpc(), &params).await {
            Ok(response) => response,
            Err(BackendError::Parse(e)) => {
                return Err(BackendError::OutcomeUnknown(format!(
                    "unreadable procedure response: {e}"
                )));
            }
            Err(e) => return Err(e),
        };

        let result = match response {
            PlaceOrderResponse::Id(id) => return Ok(id),
            PlaceOrderResponse::Rows(rows) => rows.into_iter().next().ok_or_else(|| {
                BackendError::OutcomeUnknown("procedure returned no rows".to_string())
            })?,
            PlaceOrderResponse::Result(result) => result,
        };

        match result {
            PlaceOrderResult {
                error: Some(error), ..
            } => Err(BackendError::Rejected(error)),
            PlaceOrderResult {
                success: Some(false),
                ..
            } => Err(BackendError::Rejected(
                "procedure reported failure".to_string(),
            )),
            PlaceOrderResult {
                order_id: Some(id), ..
            } => Ok(id),
            PlaceOrderResult { .. } => Err(BackendError::OutcomeUnknown(
                "procedure returned no order id".to_string(),
            )),
        }
    }

    #[instrument(skip(self, order), fields(order_code = %order.order_code))]
    async fn insert_order(&self, order: &NewOrder) -> Result<OrderId, BackendError> {
        let rows: Vec<IdRow<OrderId>> = self
            .insert("orders", &[OrderInsert::from(order)], "id")
            .await?;
        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| BackendError::MissingData("order insert returned no row".to_string()))
    }

    #[instrument(skip_all, fields(order_id = %order_id, count = items.len()))]
    async fn insert_order_items(
        &self,
        order_id: &OrderId,
        items: &[NewOrderItem],
    ) -> Result<(), BackendError> {
        if items.is_empty() {
            return Ok(());
        }
        let rows: Vec<OrderItemInsert<'_>> = items
            .iter()
            .map(|item| OrderItemInsert::new(order_id, item))
            .collect();
        self.insert_minimal("order_items", &rows).await
    }

    #[instrument(skip(self))]
    async fn list_orders_with_items(&self) -> Result<Vec<OrderRecord>, BackendError> {
        let rows: Vec<OrderRow> = self
            .from("orders")
            .select(ORDERS_WITH_ITEMS)
            .order("created_at", false)
            .fetch()
            .await?;
        Ok(rows.into_iter().map(OrderRecord::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_orders(&self) -> Result<Vec<OrderRecord>, BackendError> {
        let rows: Vec<OrderRow> = self
            .from("orders")
            .select("*")
            .order("created_at", false)
            .fetch()
            .await?;
        Ok(rows
            .into_iter()
            .map(|mut row| {
                row.order_items.clear();
                OrderRecord::from(row)
            })
            .collect())
    }

    #[instrument(skip_all, fields(order_id = %order_id, status = %status))]
    async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError> {
        let patch = StatusPatch {
            status: status.as_str(),
        };
        let updated = self
            .update("orders", &patch, "id", order_id.as_str())
            .await?;
        if updated == 0 {
            return Err(BackendError::NotFound(format!("order {order_id}")));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.from("products")
            .select("*")
            .order("created_at", false)
            .fetch()
            .await
    }

    #[instrument(skip(self))]
    async fn list_categories(&self) -> Result<Vec<Category>, BackendError> {
        self.from("categories")
            .select("id,name")
            .order("name", true)
            .fetch()
            .await
    }

    #[instrument(skip(self))]
    async fn list_customers(&self) -> Result<Vec<Customer>, BackendError> {
        self.from("customers")
            .select("*")
            .order("created_at", false)
            .fetch()
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use mockito::Matcher;
    use rust_decimal::Decimal;
    use secrecy::SecretString;

    use rojarhat_core::CustomerInfo;

    use super::*;
    use crate::config::BackendConfig;

    fn client(url: &str) -> RestClient {
        let config = BackendConfig::new(url.parse().unwrap(), SecretString::from("test-key"));
        RestClient::new(&config).unwrap()
    }

    fn new_order() -> NewOrder {
        NewOrder {
            order_code: "RH-261019-0042".to_string(),
            customer: CustomerInfo {
                name: "Rahim".to_string(),
                phone: "01700000000".to_string(),
                address: "Mirpur, Dhaka".to_string(),
                customer_id: None,
            },
            total_price: Decimal::from(1600),
            status: OrderStatus::Pending,
            items: vec![NewOrderItem {
                product_id: ProductId::new("p1"),
                product_name: "Panjabi".to_string(),
                quantity: 2,
                unit_price: Decimal::from(800),
            }],
        }
    }

    #[tokio::test]
    async fn test_existing_product_ids_single_batched_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/products")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), "id".into()),
                Matcher::UrlEncoded("id".into(), "in.(\"p1\",\"p2\")".into()),
            ]))
            .with_status(200)
            .with_body(r#"[{"id":"p1"}]"#)
            .expect(1)
            .create_async()
            .await;

        let client = client(&server.url());
        let ids = [ProductId::new("p1"), ProductId::new("p2")];
        let found = client.existing_product_ids(&ids).await.unwrap();

        mock.assert_async().await;
        assert_eq!(found.len(), 1);
        assert!(found.contains(&ProductId::new("p1")));
    }

    #[tokio::test]
    async fn test_existing_product_ids_empty_input_skips_request() {
        // Nothing listens on this port; a request would fail
        let client = client("http://127.0.0.1:9");
        let found = client.existing_product_ids(&[]).await.unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn test_place_order_atomic_sends_procedure_params() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/rpc/place_order")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "p_customer_name": "Rahim",
                "p_order_code": "RH-261019-0042",
                "p_items": [{"product_id": "p1", "quantity": 2}]
            })))
            .with_status(200)
            .with_body(r#"{"success":true,"order_id":"o-1"}"#)
            .create_async()
            .await;

        let client = client(&server.url());
        let id = client.place_order_atomic(&new_order()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(id.as_str(), "o-1");
    }

    #[tokio::test]
    async fn test_place_order_atomic_rejection() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/rest/v1/rpc/place_order")
            .with_status(200)
            .with_body(r#"{"success":false,"error":"Insufficient stock for Panjabi"}"#)
            .create_async()
            .await;

        let client = client(&server.url());
        let result = client.place_order_atomic(&new_order()).await;

        assert!(
            matches!(result, Err(BackendError::Rejected(msg)) if msg.contains("Insufficient stock"))
        );
    }

    #[tokio::test]
    async fn test_place_order_atomic_accepts_table_rows() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/rest/v1/rpc/place_order")
            .with_status(200)
            .with_body(r#"[{"order_id":"o-atomic"}]"#)
            .create_async()
            .await;

        let id = client(&server.url())
            .place_order_atomic(&new_order())
            .await
            .unwrap();

        assert_eq!(id.as_str(), "o-atomic");
    }

    #[tokio::test]
    async fn test_place_order_atomic_unreadable_success_is_outcome_unknown() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/rest/v1/rpc/place_order")
            .with_status(200)
            .with_body("ok")
            .create_async()
            .await;

        let result = client(&server.url()).place_order_atomic(&new_order()).await;

        assert!(matches!(result, Err(BackendError::OutcomeUnknown(_))));
    }

    #[tokio::test]
    async fn test_place_order_atomic_success_without_id_is_outcome_unknown() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("POST", "/rest/v1/rpc/place_order")
            .with_status(200)
            .with_body(r#"{"success":true}"#)
            .create_async()
            .await;

        let result = client(&server.url()).place_order_atomic(&new_order()).await;

        assert!(matches!(result, Err(BackendError::OutcomeUnknown(_))));
    }

    #[tokio::test]
    async fn test_insert_order_returns_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/rest/v1/orders")
            .match_query(Matcher::UrlEncoded("select".into(), "id".into()))
            .match_header("Prefer", "return=representation")
            .match_body(Matcher::PartialJson(serde_json::json!([{
                "order_code": "RH-261019-0042",
                "status": "pending"
            }])))
            .with_status(201)
            .with_body(r#"[{"id":"o-9"}]"#)
            .create_async()
            .await;

        let client = client(&server.url());
        let id = client.insert_order(&new_order()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(id.as_str(), "o-9");
    }

    #[tokio::test]
    async fn test_update_status_not_found() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("PATCH", "/rest/v1/orders")
            .match_query(Matcher::UrlEncoded("id".into(), "eq.missing".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = client(&server.url());
        let result = client
            .update_order_status(&OrderId::new("missing"), OrderStatus::Delivered)
            .await;

        assert!(matches!(result, Err(BackendError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_orders_with_items_uses_embedded_select() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/rest/v1/orders")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("select".into(), ORDERS_WITH_ITEMS.into()),
                Matcher::UrlEncoded("order".into(), "created_at.desc".into()),
            ]))
            .with_status(200)
            .with_body(
                r#"[{"id":"o1","customer_name":"Rahim","total_price":800,"status":"processing",
                     "created_at":"2026-10-19T08:00:00Z",
                     "order_items":[{"product_id":"p1","product_name":"Panjabi","quantity":1,"price":800,"products":{"name":"Panjabi"}}]}]"#,
            )
            .create_async()
            .await;

        let client = client(&server.url());
        let records = client.list_orders_with_items().await.unwrap();

        mock.assert_async().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].items.len(), 1);
        assert_eq!(records[0].status.as_deref(), Some("processing"));
    }
}
