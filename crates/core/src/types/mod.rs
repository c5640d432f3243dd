//! Core types for RojarHat.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod catalog;
pub mod id;
pub mod order;
pub mod price;
pub mod status;

pub use cart::CartLine;
pub use catalog::{Category, Customer, Product};
pub use id::*;
pub use order::{
    CachedOrder, CachedOrderItem, CustomerInfo, NewOrder, NewOrderItem, Order, OrderItem,
    OrderItemRecord, OrderRecord,
};
pub use price::{CurrencyCode, Price};
pub use status::OrderStatus;
