//! Checkout over the REST client against a mocked hosted backend.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use mockito::{Matcher, Mock, ServerGuard};
use secrecy::SecretString;

use rojarhat_backend::{BackendConfig, MemoryStorage, RestClient};
use rojarhat_core::{OrderId, messages};
use rojarhat_integration_tests::{product, shopper};
use rojarhat_storefront::{CartStore, CheckoutConfig, OrderWriter, PlaceOrderOutcome, WritePath};

struct Backend {
    server: ServerGuard,
    // Mocks stop matching once dropped
    mocks: Vec<Mock>,
    writer: OrderWriter,
    cart: CartStore<Arc<MemoryStorage>>,
}

async fn backend_with_saree() -> Backend {
    let server = mockito::Server::new_async().await;
    let config = BackendConfig::new(server.url().parse().unwrap(), SecretString::from("test-key"));
    let client = Arc::new(RestClient::new(&config).unwrap());
    let storage = Arc::new(MemoryStorage::new());

    let saree = product("জামদানি শাড়ি", 4500, 5);
    let mut cart = CartStore::load(Arc::clone(&storage));
    cart.add(&saree, 1);

    let mut backend = Backend {
        server,
        mocks: Vec::new(),
        writer: OrderWriter::new(client, storage, CheckoutConfig::default()),
        cart,
    };
    let lookup = backend
        .server
        .mock("GET", "/rest/v1/products")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(format!(r#"[{{"id":"{}"}}]"#, saree.id))
        .create_async()
        .await;
    backend.mocks.push(lookup);
    backend
}

async fn procedure_answers(backend: &mut Backend, body: &str) {
    let procedure = backend
        .server
        .mock("POST", "/rest/v1/rpc/place_order")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await;
    backend.mocks.push(procedure);
}

async fn order_insert(backend: &mut Backend) -> Mock {
    backend
        .server
        .mock("POST", "/rest/v1/orders")
        .match_query(Matcher::Any)
        .with_status(201)
        .with_body(r#"[{"id":"o-dup"}]"#)
        .expect(0)
        .create_async()
        .await
}

async fn place(backend: &Backend) -> PlaceOrderOutcome {
    backend
        .writer
        .place_order(&shopper(), backend.cart.lines(), backend.cart.total())
        .await
}

#[tokio::test]
async fn table_rows_from_procedure_are_an_atomic_order() {
    let mut backend = backend_with_saree().await;
    procedure_answers(&mut backend, r#"[{"order_id":"o-atomic"}]"#).await;
    let inserts = order_insert(&mut backend).await;

    let outcome = place(&backend).await;

    let PlaceOrderOutcome::Placed(placed) = outcome else {
        panic!("expected placed order, got {outcome:?}");
    };
    assert_eq!(placed.order_id, OrderId::new("o-atomic"));
    assert_eq!(placed.path, WritePath::Atomic);
    inserts.assert_async().await;
}

#[tokio::test]
async fn success_without_order_id_is_never_written_twice() {
    let mut backend = backend_with_saree().await;
    procedure_answers(&mut backend, r#"{"success":true}"#).await;
    let inserts = order_insert(&mut backend).await;

    let outcome = place(&backend).await;

    assert_eq!(outcome.message(), messages::ORDER_OUTCOME_UNKNOWN);
    inserts.assert_async().await;
}

#[tokio::test]
async fn unreadable_success_is_never_written_twice() {
    let mut backend = backend_with_saree().await;
    procedure_answers(&mut backend, "committed").await;
    let inserts = order_insert(&mut backend).await;

    let outcome = place(&backend).await;

    assert_eq!(outcome.message(), messages::ORDER_OUTCOME_UNKNOWN);
    inserts.assert_async().await;
}
