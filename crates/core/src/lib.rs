//! Digital Store Core - catalog, cart, pricing and checkout logic.
//!
//! This crate holds the state and rules every storefront view shares:
//! - [`catalog`] - The read-only product catalog and its search/category filter
//! - [`cart`] - Cart line items and the mutations allowed on them
//! - [`pricing`] - Subtotal, tax and total derived from cart contents
//! - [`checkout`] - The four-step checkout wizard and its field validation
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no async
//! runtime, no HTTP. Sharing, notification and the settlement task live in
//! the `storefront` crate.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod pricing;
pub mod types;

pub use cart::{Cart, LineItem};
pub use catalog::{Catalog, CatalogError, Product};
pub use pricing::CartTotals;
pub use types::*;
