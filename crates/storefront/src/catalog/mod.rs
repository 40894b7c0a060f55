//! Product catalog: sources, caching and the listing filter.
//!
//! # Sources
//!
//! - [`StaticCatalog`] - Built-in seed catalog, no network
//! - [`RemoteCatalog`] - Hosted backend `products` table
//! - [`CachedCatalog`] - `moka` TTL cache in front of either
//!
//! Pages depend on the [`CatalogSource`] trait only, so the static catalog can
//! stand in for the backend in tests and offline runs.

mod cache;
pub mod filter;
mod fixtures;
mod remote;

pub use cache::CachedCatalog;
pub use filter::{CatalogQuery, PriceRange, SortKey, categories, filter_products, price_bounds};
pub use fixtures::StaticCatalog;
pub use remote::RemoteCatalog;

use async_trait::async_trait;
use mockall::automock;

use storefront_core::{Product, ProductId};

use crate::backend::BackendError;

/// Category selection for listing and lookup.
///
/// `All` is the "no filter" sentinel; anything else is an exact,
/// case-sensitive match on [`Product::category`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    /// Label of the sentinel as shown in the category list.
    pub const ALL_LABEL: &'static str = "All";

    /// Parse a category label, mapping `"All"` to the sentinel.
    #[must_use]
    pub fn parse(label: &str) -> Self {
        if label == Self::ALL_LABEL {
            Self::All
        } else {
            Self::Only(label.to_string())
        }
    }

    /// Whether a product in `category` passes this filter.
    #[must_use]
    pub fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

impl std::fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(Self::ALL_LABEL),
            Self::Only(category) => f.write_str(category),
        }
    }
}

/// Read access to the product catalog.
///
/// A missing product is `Ok(None)`; errors mean the source itself failed.
#[automock]
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Every product, in catalog order.
    async fn list_products(&self) -> Result<Vec<Product>, BackendError>;

    /// A single product by ID.
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, BackendError>;

    /// Products in a category (`All` lists everything).
    async fn products_by_category(
        &self,
        category: &CategoryFilter,
    ) -> Result<Vec<Product>, BackendError>;

    /// Products to feature on the home page.
    async fn featured_products(&self) -> Result<Vec<Product>, BackendError>;
}
