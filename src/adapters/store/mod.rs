//! Product store abstraction layer
//!
//! This module provides the [`ProductStore`] trait and a factory that builds
//! the configured implementation.

pub mod factory;
pub mod traits;

pub use factory::create_product_store;
pub use traits::{ProductStore, StoreResult};
