//! Order management.
//!
//! - [`reader`] - Order listing with tiered fallback
//! - [`status`] - Order status changes

pub mod reader;
pub mod status;

pub use reader::{OrderReader, OrderSource};
pub use status::StatusUpdater;
