//! TTL cache in front of a [`CatalogSource`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::debug;

use storefront_core::{Product, ProductId};

use super::{CatalogSource, CategoryFilter};
use crate::backend::BackendError;

const MAX_ENTRIES: u64 = 1000;

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
enum CacheKey {
    All,
    Product(ProductId),
    Category(CategoryFilter),
    Featured,
}

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Arc<Vec<Product>>),
}

/// Wraps any catalog source with a `moka` cache.
///
/// Successful reads are cached for the configured TTL. Errors and missing
/// products are never cached, so the next read retries the source.
#[derive(Clone)]
pub struct CachedCatalog {
    source: Arc<dyn CatalogSource>,
    cache: Cache<CacheKey, CacheValue>,
}

impl std::fmt::Debug for CachedCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedCatalog")
            .field("entries", &self.cache.entry_count())
            .finish_non_exhaustive()
    }
}

impl CachedCatalog {
    /// Cache reads from `source` for `ttl`.
    #[must_use]
    pub fn new(source: Arc<dyn CatalogSource>, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_ENTRIES)
            .time_to_live(ttl)
            .build();
        Self { source, cache }
    }

    /// Drop every cached entry.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }

    async fn cached_list<F, Fut>(
        &self,
        key: CacheKey,
        fetch: F,
    ) -> Result<Vec<Product>, BackendError>
    where
        F: FnOnce() -> Fut + Send,
        Fut: std::future::Future<Output = Result<Vec<Product>, BackendError>> + Send,
    {
        if let Some(CacheValue::Products(products)) = self.cache.get(&key).await {
            debug!(key = ?key, "Catalog cache hit");
            return Ok(products.as_ref().clone());
        }

        let products = fetch().await?;
        self.cache
            .insert(key, CacheValue::Products(Arc::new(products.clone())))
            .await;
        Ok(products)
    }
}

#[async_trait]
impl CatalogSource for CachedCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.cached_list(CacheKey::All, || self.source.list_products())
            .await
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, BackendError> {
        let key = CacheKey::Product(id.clone());
        if let Some(CacheValue::Product(product)) = self.cache.get(&key).await {
            debug!(product_id = %id, "Catalog cache hit");
            return Ok(Some(*product));
        }

        let product = self.source.get_product(id).await?;
        if let Some(found) = &product {
            self.cache
                .insert(key, CacheValue::Product(Box::new(found.clone())))
                .await;
        }
        Ok(product)
    }

    async fn products_by_category(
        &self,
        category: &CategoryFilter,
    ) -> Result<Vec<Product>, BackendError> {
        self.cached_list(
            CacheKey::Category(category.clone()),
            || self.source.products_by_category(category),
        )
        .await
    }

    async fn featured_products(&self) -> Result<Vec<Product>, BackendError> {
        self.cached_list(CacheKey::Featured, || self.source.featured_products())
            .await
    }
}
