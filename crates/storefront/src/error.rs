//! Unified error handling.
//!
//! Provides a unified `AppError` for front ends. [`AppError::user_message`]
//! gives the text safe to show a shopper; the `Display` form keeps the
//! internal detail for logs.

use thiserror::Error;

use crate::backend::BackendError;
use crate::cart::{StorageError, StoreError};
use crate::checkout::CheckoutError;
use crate::config::ConfigError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Configuration is missing or invalid.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Backend API operation failed.
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Cart store operation failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Opening local state failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Checkout was refused or failed.
    #[error("Checkout error: {0}")]
    Checkout(#[from] CheckoutError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    /// Message for the shopper. Transport and storage details stay internal.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Config(err) => err.to_string(),
            Self::Backend(err) | Self::Checkout(CheckoutError::Transport(err)) => {
                backend_message(err)
            }
            Self::Store(err) | Self::Checkout(CheckoutError::Store(err)) => store_message(err),
            Self::Storage(_) => "Could not access saved cart data".to_string(),
            Self::Checkout(err) => match err {
                CheckoutError::Unauthenticated => {
                    "Please sign in to proceed with checkout".to_string()
                }
                CheckoutError::EmptyCart => "Your cart is empty".to_string(),
                CheckoutError::InvalidForm(_) => err.to_string(),
                CheckoutError::Store(_) | CheckoutError::Transport(_) => {
                    "Failed to process your order".to_string()
                }
            },
            Self::NotFound(what) => format!("{what} not found"),
        }
    }
}

fn backend_message(err: &BackendError) -> String {
    match err {
        BackendError::RateLimited(secs) => {
            format!("Too many requests, try again in {secs} seconds")
        }
        BackendError::NotFound(_) => "Not found".to_string(),
        _ => "External service error".to_string(),
    }
}

fn store_message(err: &StoreError) -> String {
    match err {
        StoreError::ValidationRejected(reason) => reason.clone(),
        StoreError::Transport(_) => "Could not update your wishlist, please try again".to_string(),
        StoreError::Storage(_) | StoreError::Serialize(_) => {
            "Could not save your cart".to_string()
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
