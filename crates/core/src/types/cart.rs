//! Cart line type.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::Product;
use super::id::ProductId;

/// A line in the shopper's cart.
///
/// The product name and unit price are snapshots taken when the product was
/// added, so the cart can show a total without a backend round trip and the
/// order writer can submit resolved prices. Quantity is always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(alias = "productId", alias = "id")]
    pub product_id: ProductId,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "unitPrice", alias = "price", default)]
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl CartLine {
    /// Snapshot a product into a new cart line.
    #[must_use]
    pub fn from_product(product: &Product, quantity: u32) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            quantity: quantity.max(1),
        }
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}
