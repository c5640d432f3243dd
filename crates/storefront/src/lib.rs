//! RojarHat Storefront - the shopper's cart and checkout.
//!
//! # Modules
//!
//! - [`cart`] - Cart and wishlist persisted on the device
//! - [`checkout`] - Cart validation, order writing and the order mirror
//! - [`config`] - Storefront configuration

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod config;

pub use cart::CartStore;
pub use checkout::{
    CartRejection, CartValidation, CartValidator, Checkout, OrderWriter, PlaceOrderOutcome,
    PlacedOrder, WritePath,
};
pub use config::{CheckoutConfig, StorefrontConfig};
