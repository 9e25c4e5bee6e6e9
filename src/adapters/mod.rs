//! External system integrations.
//!
//! - [`store`] - Product store abstraction (trait-based) and factory
//! - [`mysql`] - WooCommerce MySQL implementation
//! - [`memory`] - In-memory implementation for tests and fixture runs
//!
//! # Design Pattern
//!
//! Adapters isolate the database driver behind the
//! [`store::ProductStore`] trait so that the generation pipeline can be
//! exercised without a live database.

pub mod memory;
pub mod mysql;
pub mod store;
