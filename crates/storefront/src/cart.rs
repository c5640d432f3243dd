//! Shopper cart and wishlist, persisted on the device.
//!
//! The store is the single owner of cart state. Every mutation writes both
//! blobs back to [`DeviceStorage`]; a failed write is logged and the
//! in-memory state is kept, so the shopper's session is never lost to a
//! storage hiccup.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use rojarhat_backend::storage::{self, DeviceStorage, keys};
use rojarhat_core::{CartLine, Product, ProductId};

/// Cart lines and wishlist backed by device storage.
#[derive(Debug)]
pub struct CartStore<S: DeviceStorage> {
    storage: S,
    lines: Vec<CartLine>,
    wishlist: Vec<ProductId>,
}

impl<S: DeviceStorage> CartStore<S> {
    /// Rehydrate the cart and wishlist from `storage`.
    ///
    /// Missing or unreadable blobs yield an empty cart or wishlist. Repeated
    /// products are collapsed in first-seen order: cart lines merge their
    /// quantities, wishlist entries are kept once.
    pub fn load(storage: S) -> Self {
        let mut lines: Vec<CartLine> = Vec::new();
        for mut stored in load_or_default::<CartLine, _>(&storage, keys::CART) {
            stored.quantity = stored.quantity.max(1);
            match lines.iter_mut().find(|l| l.product_id == stored.product_id) {
                Some(line) => line.quantity = line.quantity.saturating_add(stored.quantity),
                None => lines.push(stored),
            }
        }

        let mut wishlist: Vec<ProductId> = Vec::new();
        for id in load_or_default::<ProductId, _>(&storage, keys::WISHLIST) {
            if !wishlist.contains(&id) {
                wishlist.push(id);
            }
        }

        debug!(lines = lines.len(), "Cart loaded");
        Self {
            storage,
            lines,
            wishlist,
        }
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add `quantity` of `product`, merging with an existing line.
    ///
    /// A quantity of zero adds one unit.
    pub fn add(&mut self, product: &Product, quantity: u32) {
        let quantity = quantity.max(1);
        if let Some(line) = self.line_mut(&product.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.lines.push(CartLine::from_product(product, quantity));
        }
        self.persist();
    }

    /// Change a line's quantity by `delta`. The result never drops below 1.
    pub fn update_quantity(&mut self, product_id: &ProductId, delta: i64) {
        let Some(line) = self.line_mut(product_id) else {
            return;
        };
        let next = i64::from(line.quantity).saturating_add(delta).max(1);
        line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        self.persist();
    }

    /// Set a line's quantity. Values below 1 are ignored.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) {
        if quantity < 1 {
            return;
        }
        let Some(line) = self.line_mut(product_id) else {
            return;
        };
        line.quantity = quantity;
        self.persist();
    }

    /// Remove a line.
    pub fn remove(&mut self, product_id: &ProductId) {
        let before = self.lines.len();
        self.lines.retain(|line| &line.product_id != product_id);
        if self.lines.len() != before {
            self.persist();
        }
    }

    /// Empty the cart. The wishlist is kept.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Add or remove a product from the wishlist. Returns the new membership.
    pub fn toggle_wishlist(&mut self, product_id: &ProductId) -> bool {
        let present = if let Some(pos) = self.wishlist.iter().position(|id| id == product_id) {
            self.wishlist.remove(pos);
            false
        } else {
            self.wishlist.push(product_id.clone());
            true
        };
        self.persist();
        present
    }

    // =========================================================================
    // Views
    // =========================================================================

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct products in the cart.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of unit price times quantity.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    #[must_use]
    pub fn wishlist(&self) -> &[ProductId] {
        &self.wishlist
    }

    #[must_use]
    pub fn wishlist_count(&self) -> usize {
        self.wishlist.len()
    }

    #[must_use]
    pub fn is_wishlisted(&self, product_id: &ProductId) -> bool {
        self.wishlist.contains(product_id)
    }

    /// The underlying storage.
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }

    fn persist(&self) {
        if let Err(e) = storage::write_blob(&self.storage, keys::CART, &self.lines) {
            warn!(error = %e, "Failed to persist cart");
        }
        if let Err(e) = storage::write_blob(&self.storage, keys::WISHLIST, &self.wishlist) {
            warn!(error = %e, "Failed to persist wishlist");
        }
    }
}

fn load_or_default<T, S>(device: &S, key: &str) -> Vec<T>
where
    T: serde::de::DeserializeOwned,
    S: DeviceStorage,
{
    match storage::read_blob::<Vec<T>, _>(device, key) {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            warn!(key = %key, error = %e, "Discarding unreadable device state");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use rojarhat_backend::{MemoryStorage, StorageError};

    use super::*;

    fn product(id: &str, price: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            price: Decimal::from(price),
            stock: 10,
            category: None,
            created_at: None,
        }
    }

    fn store() -> CartStore<Arc<MemoryStorage>> {
        CartStore::load(Arc::new(MemoryStorage::new()))
    }

    #[test]
    fn test_add_merges_lines() {
        let mut cart = store();
        cart.add(&product("a", 100), 2);
        cart.add(&product("a", 100), 0);
        cart.add(&product("b", 50), 1);

        assert_eq!(cart.line_count(), 2);
        assert_eq!(cart.item_count(), 4);
        assert_eq!(cart.total(), Decimal::from(350));
    }

    #[test]
    fn test_update_quantity_floors_at_one() {
        let mut cart = store();
        let id = ProductId::new("a");
        cart.add(&product("a", 100), 3);

        cart.update_quantity(&id, -10);
        assert_eq!(cart.lines()[0].quantity, 1);

        cart.update_quantity(&id, 4);
        assert_eq!(cart.lines()[0].quantity, 5);

        cart.update_quantity(&ProductId::new("missing"), 1);
        assert_eq!(cart.line_count(), 1);
    }

    #[test]
    fn test_set_quantity_ignores_zero() {
        let mut cart = store();
        let id = ProductId::new("a");
        cart.add(&product("a", 100), 3);

        cart.set_quantity(&id, 0);
        assert_eq!(cart.lines()[0].quantity, 3);

        cart.set_quantity(&id, 7);
        assert_eq!(cart.lines()[0].quantity, 7);
    }

    #[test]
    fn test_state_survives_reload() {
        let storage = Arc::new(MemoryStorage::new());
        {
            let mut cart = CartStore::load(Arc::clone(&storage));
            cart.add(&product("a", 100), 2);
            assert!(cart.toggle_wishlist(&ProductId::new("w")));
        }

        let cart = CartStore::load(storage);
        assert_eq!(cart.item_count(), 2);
        assert!(cart.is_wishlisted(&ProductId::new("w")));
    }

    #[test]
    fn test_toggle_wishlist_twice_removes() {
        let mut cart = store();
        let id = ProductId::new("w");

        assert!(cart.toggle_wishlist(&id));
        assert!(!cart.toggle_wishlist(&id));
        assert_eq!(cart.wishlist_count(), 0);
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.save(keys::CART, "not json").unwrap();

        let cart = CartStore::load(storage);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_legacy_bare_array_is_read() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .save(
                keys::CART,
                r#"[{"productId":"a","name":"Saree","price":1200,"quantity":0}]"#,
            )
            .unwrap();

        let cart = CartStore::load(storage);
        assert_eq!(cart.lines()[0].quantity, 1);
        assert_eq!(cart.total(), Decimal::from(1200));
    }

    #[test]
    fn test_repeated_wishlist_entries_load_once() {
        let storage = Arc::new(MemoryStorage::new());
        storage::write_blob(&*storage, keys::WISHLIST, &["w", "w"]).unwrap();

        let mut cart = CartStore::load(storage);
        let id = ProductId::new("w");
        assert_eq!(cart.wishlist_count(), 1);

        assert!(!cart.toggle_wishlist(&id));
        assert!(cart.toggle_wishlist(&id));
        assert!(cart.is_wishlisted(&id));
        assert_eq!(cart.wishlist_count(), 1);
    }

    #[test]
    fn test_repeated_cart_lines_merge_on_load() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .save(
                keys::CART,
                r#"[{"productId":"a","name":"Saree","price":1200,"quantity":2},
                    {"productId":"b","name":"Shawl","price":800,"quantity":1},
                    {"productId":"a","name":"Saree","price":1200,"quantity":0}]"#,
            )
            .unwrap();

        let cart = CartStore::load(storage);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].product_id, ProductId::new("a"));
        assert_eq!(cart.lines()[0].quantity, 3);
        assert_eq!(cart.item_count(), 4);
    }

    struct FailingStorage;

    impl DeviceStorage for FailingStorage {
        fn load(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn save(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Io(std::io::Error::other("disk full")))
        }

        fn remove(&self, _key: &str) -> Result<(), StorageError> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut cart = CartStore::load(FailingStorage);
        cart.add(&product("a", 100), 1);

        assert_eq!(cart.item_count(), 1);
    }
}
