//! Shared fixtures for the cross-crate tests.
//!
//! Every test runs the real storefront and admin components against the
//! in-memory backend, so no hosted backend is needed:
//!
//! ```bash
//! cargo test -p rojarhat-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use rust_decimal::Decimal;
use uuid::Uuid;

use rojarhat_admin::{OrderReader, StatusUpdater};
use rojarhat_backend::MemoryStorage;
use rojarhat_backend::memory::MemoryBackend;
use rojarhat_core::{CustomerInfo, Product, ProductId};
use rojarhat_storefront::{CartStore, Checkout, CheckoutConfig, OrderWriter};

/// A product with a fresh UUID.
#[must_use]
pub fn product(name: &str, price: i64, stock: i32) -> Product {
    Product {
        id: ProductId::new(Uuid::new_v4().to_string()),
        name: name.to_string(),
        price: Decimal::from(price),
        stock,
        category: None,
        created_at: None,
    }
}

/// A product whose ID is not a UUID.
#[must_use]
pub fn malformed_product(id: &str) -> Product {
    Product {
        id: ProductId::new(id),
        ..product("ভুল পণ্য", 100, 5)
    }
}

#[must_use]
pub fn shopper() -> CustomerInfo {
    CustomerInfo {
        name: "রহিম উদ্দিন".to_string(),
        phone: "01700000000".to_string(),
        address: "মিরপুর ১০, ঢাকা".to_string(),
        customer_id: None,
    }
}

/// One device talking to one backend: a storefront and an admin view.
pub struct Shop {
    pub backend: Arc<MemoryBackend>,
    pub storage: Arc<MemoryStorage>,
    pub checkout: Checkout,
    pub reader: OrderReader,
    pub updater: StatusUpdater,
}

impl Shop {
    /// A shop whose catalog holds `products`.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        Self::with_config(products, CheckoutConfig::default())
    }

    #[must_use]
    pub fn with_config(products: Vec<Product>, config: CheckoutConfig) -> Self {
        let backend = Arc::new(MemoryBackend::with_products(products));
        let storage = Arc::new(MemoryStorage::new());
        let writer = OrderWriter::new(backend.clone(), storage.clone(), config);
        Self {
            checkout: Checkout::new(writer),
            reader: OrderReader::new(backend.clone(), storage.clone()),
            updater: StatusUpdater::new(backend.clone()),
            backend,
            storage,
        }
    }

    /// The cart stored on this shop's device.
    #[must_use]
    pub fn cart(&self) -> CartStore<Arc<MemoryStorage>> {
        CartStore::load(Arc::clone(&self.storage))
    }
}
