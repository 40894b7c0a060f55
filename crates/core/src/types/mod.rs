//! Core types for the storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;
pub mod status;

pub use id::{OrderId, ProductId, UserId};
pub use price::{Price, PriceError};
pub use product::Product;
pub use status::{OrderStatus, PaymentMethod};
