//! RojarHat Core - Shared types library.
//!
//! This crate provides common types used across all RojarHat components:
//! - `backend` - Hosted backend client, device storage and change feeds
//! - `storefront` - Cart store, cart validation and order placement
//! - `admin` - Order listing, status updates and dashboard loading
//! - `cli` - Command-line surface over the above
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! backend access, no HTTP clients. This keeps it lightweight and allows it
//! to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, statuses, products, orders and cart lines
//! - [`stats`] - Dashboard aggregators over order and product snapshots
//! - [`messages`] - Localized (Bengali) user-facing strings

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod messages;
pub mod stats;
pub mod types;

pub use types::*;
