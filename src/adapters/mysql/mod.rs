//! MySQL (WooCommerce) store implementation
//!
//! This module provides the production [`crate::adapters::store::ProductStore`]
//! backed by `sqlx`.

pub mod adapter;
pub mod client;

pub use adapter::MySqlStore;
pub use client::{MySqlClient, TableNames};
