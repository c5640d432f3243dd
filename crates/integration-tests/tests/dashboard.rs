//! Dashboard figures after real checkouts.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use rust_decimal::Decimal;

use rojarhat_admin::{Resource, load_dashboard};
use rojarhat_backend::StoreBackend;
use rojarhat_core::{OrderStatus, Product};
use rojarhat_integration_tests::{Shop, product, shopper};
use rojarhat_storefront::PlaceOrderOutcome;

fn categorized(name: &str, price: i64, stock: i32, category: &str) -> Product {
    Product {
        category: Some(category.to_string()),
        ..product(name, price, stock)
    }
}

async fn checkout(shop: &Shop, item: &Product, quantity: u32) -> PlaceOrderOutcome {
    let mut cart = shop.cart();
    cart.add(item, quantity);
    shop.checkout.submit(&mut cart, &shopper()).await
}

#[tokio::test]
async fn dashboard_reflects_orders_and_stock() {
    let saree = categorized("জামদানি শাড়ি", 4500, 12, "শাড়ি");
    let panjabi = categorized("সুতি পাঞ্জাবি", 1500, 3, "পাঞ্জাবি");
    let shop = Shop::with_products(vec![saree.clone(), panjabi.clone()]);
    shop.backend.add_category("শাড়ি");
    shop.backend.add_category("পাঞ্জাবি");
    shop.backend.add_category("গহনা");
    shop.backend.add_customer("করিম", None);

    checkout(&shop, &saree, 3).await;
    let PlaceOrderOutcome::Placed(second) = checkout(&shop, &panjabi, 3).await else {
        panic!("expected placed order");
    };
    shop.updater
        .update_status(&second.order_id, OrderStatus::Delivered)
        .await
        .unwrap();

    let backend: Arc<dyn StoreBackend> = shop.backend.clone();
    let snapshot = load_dashboard(&backend, &shop.reader).await;

    assert!(snapshot.is_complete());
    assert_eq!(snapshot.sales.order_count, 2);
    assert_eq!(snapshot.sales.total_revenue, Decimal::from(4500 * 3 + 1500 * 3));
    assert_eq!(snapshot.sales.today_order_count, 2);
    assert_eq!(snapshot.sales.average_order_value, Decimal::from(9000));
    assert_eq!(snapshot.sales.by_status.get(OrderStatus::Pending), 1);
    assert_eq!(snapshot.sales.by_status.get(OrderStatus::Delivered), 1);

    // Saree 12 -> 9 is low; panjabi 3 -> 0 is low and out
    assert_eq!(snapshot.inventory.low_stock, 2);
    assert_eq!(snapshot.inventory.out_of_stock, 1);
    assert_eq!(snapshot.inventory.total_units, 9);

    let counts: Vec<(&str, usize)> = snapshot
        .category_counts
        .iter()
        .map(|(category, count)| (category.name.as_str(), *count))
        .collect();
    assert_eq!(counts, vec![("শাড়ি", 1), ("পাঞ্জাবি", 1), ("গহনা", 0)]);
    assert_eq!(snapshot.customers.len(), 1);
}

#[tokio::test]
async fn catalog_outage_leaves_orders_on_the_dashboard() {
    let saree = product("জামদানি শাড়ি", 4500, 12);
    let shop = Shop::with_products(vec![saree.clone()]);
    checkout(&shop, &saree, 1).await;
    shop.backend.update_faults(|f| f.catalog_read = true);

    let backend: Arc<dyn StoreBackend> = shop.backend.clone();
    let snapshot = load_dashboard(&backend, &shop.reader).await;

    assert_eq!(
        snapshot.failed,
        vec![Resource::Products, Resource::Categories, Resource::Customers]
    );
    assert!(snapshot.products.is_empty());
    assert_eq!(snapshot.sales.order_count, 1);
    assert_eq!(snapshot.inventory.product_count, 0);
}

#[tokio::test]
async fn order_outage_is_reported_separately() {
    let saree = product("জামদানি শাড়ি", 4500, 12);
    let shop = Shop::with_products(vec![saree]);
    shop.backend.update_faults(|f| {
        f.joined_read = true;
        f.flat_read = true;
    });

    let backend: Arc<dyn StoreBackend> = shop.backend.clone();
    let snapshot = load_dashboard(&backend, &shop.reader).await;

    assert_eq!(snapshot.failed, vec![Resource::Orders]);
    assert_eq!(snapshot.sales.order_count, 0);
    assert_eq!(snapshot.inventory.product_count, 1);
}
