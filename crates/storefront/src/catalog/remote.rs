//! Catalog backed by the hosted `products` table.

use async_trait::async_trait;
use tracing::instrument;

use storefront_core::{Product, ProductId};

use super::{CatalogSource, CategoryFilter};
use crate::backend::{BackendClient, BackendError};

const TABLE: &str = "products";

/// How many products the remote home page features.
const FEATURED_LIMIT: &str = "8";

/// Reads products from the backend REST API.
#[derive(Debug, Clone)]
pub struct RemoteCatalog {
    client: BackendClient,
}

impl RemoteCatalog {
    #[must_use]
    pub const fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CatalogSource for RemoteCatalog {
    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        self.client.select(TABLE, &[("select", "*")]).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, BackendError> {
        let filter = format!("eq.{id}");
        self.client
            .select_single(TABLE, &[("select", "*"), ("id", filter.as_str())])
            .await
    }

    #[instrument(skip(self), fields(category = %category))]
    async fn products_by_category(
        &self,
        category: &CategoryFilter,
    ) -> Result<Vec<Product>, BackendError> {
        match category {
            CategoryFilter::All => self.list_products().await,
            CategoryFilter::Only(name) => {
                let filter = format!("eq.{name}");
                self.client
                    .select(TABLE, &[("select", "*"), ("category", filter.as_str())])
                    .await
            }
        }
    }

    #[instrument(skip(self))]
    async fn featured_products(&self) -> Result<Vec<Product>, BackendError> {
        self.client
            .select(
                TABLE,
                &[
                    ("select", "*"),
                    ("order", "rating.desc"),
                    ("limit", FEATURED_LIMIT),
                ],
            )
            .await
    }
}
