//! Cart and wishlist commands.
//!
//! # Usage
//!
//! ```bash
//! rh-cli cart add 3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b -q 2
//! rh-cli cart update 3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b -1
//! rh-cli cart show
//! rh-cli wishlist toggle 3f2b8c1e-9a4d-4e6b-8f1a-2c3d4e5f6a7b
//! ```

use std::sync::Arc;

use thiserror::Error;

use rojarhat_backend::FileStorage;
use rojarhat_core::{Price, Product, ProductId};
use rojarhat_storefront::CartStore;

use crate::config::Context;

/// Errors from cart commands.
#[derive(Debug, Error)]
pub enum CartCommandError {
    /// No product with this ID exists in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),
}

fn open(ctx: &Context) -> CartStore<Arc<FileStorage>> {
    CartStore::load(Arc::clone(&ctx.storage))
}

/// Print the cart.
pub fn show(ctx: &Context) {
    print_cart(&open(ctx));
}

/// Look up a product and add it to the cart.
///
/// # Errors
///
/// Returns an error if the backend is unreachable or the product does not exist.
pub async fn add(
    ctx: &Context,
    product_id: &str,
    quantity: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let client = ctx.client()?;
    let id = ProductId::new(product_id);

    let product: Product = client
        .from("products")
        .select("*")
        .eq("id", id.as_str())
        .fetch()
        .await?
        .into_iter()
        .next()
        .ok_or(CartCommandError::ProductNotFound(id))?;

    let mut cart = open(ctx);
    cart.add(&product, quantity);
    tracing::info!(product = %product.name, quantity, "Added to cart");
    print_cart(&cart);
    Ok(())
}

/// Change a line's quantity by `delta`.
pub fn update(ctx: &Context, product_id: &str, delta: i64) {
    let mut cart = open(ctx);
    cart.update_quantity(&ProductId::new(product_id), delta);
    print_cart(&cart);
}

/// Set a line's quantity.
pub fn set(ctx: &Context, product_id: &str, quantity: u32) {
    let mut cart = open(ctx);
    cart.set_quantity(&ProductId::new(product_id), quantity);
    print_cart(&cart);
}

/// Remove a line.
pub fn remove(ctx: &Context, product_id: &str) {
    let mut cart = open(ctx);
    cart.remove(&ProductId::new(product_id));
    print_cart(&cart);
}

/// Empty the cart.
pub fn clear(ctx: &Context) {
    open(ctx).clear();
    tracing::info!("Cart cleared");
}

/// Print the wishlist.
pub fn wishlist_show(ctx: &Context) {
    let cart = open(ctx);

    #[allow(clippy::print_stdout)]
    {
        println!("Wishlist ({} items)", cart.wishlist_count());
        for id in cart.wishlist() {
            println!("  {id}");
        }
    }
}

/// Add or remove a product from the wishlist.
pub fn wishlist_toggle(ctx: &Context, product_id: &str) {
    let mut cart = open(ctx);
    let id = ProductId::new(product_id);
    let added = cart.toggle_wishlist(&id);

    #[allow(clippy::print_stdout)]
    {
        if added {
            println!("Added {id} to wishlist");
        } else {
            println!("Removed {id} from wishlist");
        }
    }
}

fn print_cart(cart: &CartStore<Arc<FileStorage>>) {
    #[allow(clippy::print_stdout)]
    {
        if cart.is_empty() {
            println!("{}", rojarhat_core::messages::CART_EMPTY);
            return;
        }
        for line in cart.lines() {
            println!(
                "  {:<38} {:<24} {:>3} x {:>10} = {:>10}",
                line.product_id,
                line.name,
                line.quantity,
                Price::taka(line.unit_price),
                Price::taka(line.line_total()),
            );
        }
        println!(
            "{} lines, {} items, total {}",
            cart.line_count(),
            cart.item_count(),
            Price::taka(cart.total())
        );
    }
}
