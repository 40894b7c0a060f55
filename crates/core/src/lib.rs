//! Storefront Core - Shared types library.
//!
//! This crate provides the types shared by the storefront components:
//! - `storefront` - Cart/wishlist store, catalog, checkout
//! - `cli` - Command-line front end over the store and catalog
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! persistence. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and prices, the catalog `Product`,
//!   and order/payment enums

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
