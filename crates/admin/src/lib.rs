//! RojarHat Admin - order management and the dashboard.
//!
//! # Modules
//!
//! - [`orders`] - Order listing with fallback tiers, status changes
//! - [`dashboard`] - Concurrent dashboard fetch and summaries
//! - [`realtime`] - Live order list driven by a change feed or by polling
//! - [`error`] - Admin error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod dashboard;
pub mod error;
pub mod orders;
pub mod realtime;

pub use dashboard::{DashboardSnapshot, Resource, load_dashboard};
pub use error::{AdminError, StatusUpdateError};
pub use orders::{OrderReader, OrderSource, StatusUpdater};
pub use realtime::{poll_order_changes, watch_orders};
