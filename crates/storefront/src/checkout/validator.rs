//! Cart validation against the catalog.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, instrument};

use rojarhat_backend::{BackendError, StoreBackend};
use rojarhat_core::{CartLine, ProductId};

/// Problems found in a cart. Both lists empty means the cart is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartValidation {
    /// IDs that are not well-formed product identifiers.
    pub invalid_ids: Vec<ProductId>,
    /// Well-formed IDs with no matching product.
    pub missing_ids: Vec<ProductId>,
}

impl CartValidation {
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.invalid_ids.is_empty() && self.missing_ids.is_empty()
    }
}

/// Checks cart lines before an order is written.
#[derive(Clone)]
pub struct CartValidator {
    backend: Arc<dyn StoreBackend>,
}

impl CartValidator {
    #[must_use]
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Partition the cart's product IDs into malformed and missing.
    ///
    /// IDs are looked up in their lowercase form; the reported IDs keep the
    /// spelling the cart used. Issues at most one backend query, and none
    /// when no ID is well formed.
    ///
    /// # Errors
    ///
    /// Returns `BackendError` if the product lookup fails.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn validate(&self, lines: &[CartLine]) -> Result<CartValidation, BackendError> {
        let mut seen = HashSet::new();
        let mut invalid_ids = Vec::new();
        let mut candidates = Vec::new();

        for line in lines {
            let canonical = line.product_id.canonical();
            if !seen.insert(canonical.clone()) {
                continue;
            }
            if line.product_id.is_well_formed() {
                candidates.push((line.product_id.clone(), canonical));
            } else {
                invalid_ids.push(line.product_id.clone());
            }
        }

        let missing_ids = if candidates.is_empty() {
            Vec::new()
        } else {
            let lookup: Vec<ProductId> = candidates.iter().map(|(_, id)| id.clone()).collect();
            let existing: HashSet<ProductId> = self
                .backend
                .existing_product_ids(&lookup)
                .await?
                .iter()
                .map(ProductId::canonical)
                .collect();
            candidates
                .into_iter()
                .filter(|(_, canonical)| !existing.contains(canonical))
                .map(|(original, _)| original)
                .collect()
        };

        let validation = CartValidation {
            invalid_ids,
            missing_ids,
        };
        debug!(
            invalid = validation.invalid_ids.len(),
            missing = validation.missing_ids.len(),
            "Cart validated"
        );
        Ok(validation)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rojarhat_backend::memory::{BackendCall, MemoryBackend};
    use rojarhat_core::Product;
    use rust_decimal::Decimal;

    use super::*;

    const KNOWN: &str = "3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b";
    const UNKNOWN: &str = "00000000-0000-4000-8000-000000000000";

    fn line(id: &str) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            name: "Item".to_string(),
            unit_price: Decimal::from(100),
            quantity: 1,
        }
    }

    fn backend() -> Arc<MemoryBackend> {
        Arc::new(MemoryBackend::with_products(vec![Product {
            id: ProductId::new(KNOWN),
            name: "Saree".to_string(),
            price: Decimal::from(100),
            stock: 5,
            category: None,
            created_at: None,
        }]))
    }

    #[tokio::test]
    async fn test_valid_cart() {
        let backend = backend();
        let validator = CartValidator::new(backend.clone());

        let result = validator.validate(&[line(KNOWN)]).await.unwrap();

        assert!(result.is_valid());
        assert_eq!(backend.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_partitions_invalid_and_missing() {
        let backend = backend();
        let validator = CartValidator::new(backend.clone());

        let result = validator
            .validate(&[line("abc"), line(KNOWN), line(UNKNOWN), line("abc")])
            .await
            .unwrap();

        assert_eq!(result.invalid_ids, vec![ProductId::new("abc")]);
        assert_eq!(result.missing_ids, vec![ProductId::new(UNKNOWN)]);
        assert_eq!(
            backend.calls(),
            vec![BackendCall::ExistingProducts(vec![
                ProductId::new(KNOWN),
                ProductId::new(UNKNOWN)
            ])]
        );
    }

    #[tokio::test]
    async fn test_uppercase_id_matches_stored_product() {
        let backend = backend();
        let validator = CartValidator::new(backend.clone());
        let upper = KNOWN.to_ascii_uppercase();

        let result = validator
            .validate(&[line(&upper), line(KNOWN)])
            .await
            .unwrap();

        assert!(result.is_valid());
        assert_eq!(
            backend.calls(),
            vec![BackendCall::ExistingProducts(vec![ProductId::new(KNOWN)])]
        );
    }

    #[tokio::test]
    async fn test_missing_uppercase_id_keeps_cart_spelling() {
        let validator = CartValidator::new(backend());
        let upper = "0000000A-0000-4ABC-8000-00000000000F";

        let result = validator.validate(&[line(upper)]).await.unwrap();

        assert!(result.invalid_ids.is_empty());
        assert_eq!(result.missing_ids, vec![ProductId::new(upper)]);
    }

    #[tokio::test]
    async fn test_no_query_without_well_formed_ids() {
        let backend = backend();
        let validator = CartValidator::new(backend.clone());

        let empty = validator.validate(&[]).await.unwrap();
        let malformed = validator.validate(&[line("xyz")]).await.unwrap();

        assert!(empty.is_valid());
        assert_eq!(malformed.invalid_ids.len(), 1);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_lookup_failure_propagates() {
        let backend = backend();
        backend.update_faults(|f| f.product_lookup = true);
        let validator = CartValidator::new(backend);

        let result = validator.validate(&[line(KNOWN)]).await;
        assert!(result.is_err());
    }
}
