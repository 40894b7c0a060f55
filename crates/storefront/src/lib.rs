//! Storefront library.
//!
//! The shopper-side domain core of the store, usable from any front end:
//!
//! - [`cart`] - Cart, saved-for-later and wishlist state with local persistence
//! - [`catalog`] - Product sources, caching and the listing filter
//! - [`checkout`] - Form validation, pricing and order placement
//! - [`backend`] - REST client for the hosted backend
//! - [`config`] - Environment configuration
//! - [`state`] - Shared application state wiring the above together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod state;

#[cfg(test)]
mod test_support;

pub use error::{AppError, Result};
pub use state::AppState;
