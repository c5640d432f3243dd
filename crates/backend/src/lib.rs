//! RojarHat Backend - hosted backend access, device storage and change feeds.
//!
//! # Architecture
//!
//! The storefront and the admin never talk HTTP directly. They depend on
//! [`StoreBackend`], which [`RestClient`] implements over the hosted
//! backend's REST interface. Device-local state (cart, wishlist, order
//! mirror) goes through [`DeviceStorage`].
//!
//! # Modules
//!
//! - [`config`] - Backend configuration from environment variables
//! - [`error`] - Backend and storage errors
//! - [`store`] - The [`StoreBackend`] trait
//! - [`rest`] - REST client and its [`StoreBackend`] implementation
//! - [`storage`] - Versioned blob storage on the device
//! - [`realtime`] - Table change subscriptions
//! - `memory` - In-process backend with fault injection (feature `memory`)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
#[cfg(feature = "memory")]
pub mod memory;
pub mod realtime;
pub mod rest;
pub mod storage;
pub mod store;

pub use config::{BackendConfig, ConfigError};
pub use error::{BackendError, StorageError};
pub use realtime::{ChangeEvent, ChangeFeed, ChangeHub, ChangeKind, Subscription};
pub use rest::RestClient;
pub use storage::{DeviceStorage, FileStorage, MemoryStorage};
pub use store::StoreBackend;
