//! Hosted backend-as-a-service client.
//!
//! # Architecture
//!
//! - PostgREST-compatible REST API at `<url>/rest/v1/<table>`
//! - `reqwest` for HTTP, `serde_json` for rows
//! - Anon key for public reads, the shopper's access token once signed in
//!
//! # Tables
//!
//! - `products` - Catalog (see [`crate::catalog::RemoteCatalog`])
//! - `wishlists` - Remote wishlist mirror, unique on `(user_id, product_id)`
//! - `orders` / `order_items` - Checkout submissions
//!
//! # Example
//!
//! ```rust,ignore
//! use storefront::backend::BackendClient;
//!
//! let client = BackendClient::new(&config)?;
//! let rows: Vec<Product> = client.select("products", &[("select", "*")]).await?;
//! ```

mod client;

pub use client::BackendClient;

use thiserror::Error;

/// SQLSTATE for a unique-constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// PostgREST code when a single-object request matched zero rows.
pub const NO_ROWS: &str = "PGRST116";

/// Errors that can occur when talking to the hosted backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend URL could not be built.
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Insert hit a unique constraint.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Single-row lookup matched nothing.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other error response.
    #[error("API error ({status}){}: {message}", format_code(.code.as_deref()))]
    Api {
        /// HTTP status code.
        status: u16,
        /// PostgREST / SQLSTATE error code, when present.
        code: Option<String>,
        /// Error message from the response body.
        message: String,
    },
}

impl BackendError {
    /// Whether this is a duplicate-key conflict (safe to treat an insert as done).
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Whether this is a not-found response.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

fn format_code(code: Option<&str>) -> String {
    code.map_or_else(String::new, |c| format!(" [{c}]"))
}
