//! Remote mirror of wishlist membership.

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use tracing::instrument;

use storefront_core::{ProductId, UserId};

use crate::backend::{BackendClient, BackendError};

/// Mirrors wishlist membership to a remote store keyed by (user, product).
#[automock]
#[async_trait]
pub trait WishlistSync: Send + Sync {
    /// Record that `user` wishes for `product`.
    ///
    /// A duplicate-key conflict means the row already exists.
    async fn add(&self, user: &UserId, product: &ProductId) -> Result<(), BackendError>;

    /// Drop the (user, product) row.
    async fn remove(&self, user: &UserId, product: &ProductId) -> Result<(), BackendError>;
}

/// [`WishlistSync`] over the backend `wishlists` table.
#[derive(Debug, Clone)]
pub struct RemoteWishlistSync {
    client: BackendClient,
}

#[derive(Serialize)]
struct WishlistRow<'a> {
    user_id: &'a UserId,
    product_id: &'a ProductId,
}

impl RemoteWishlistSync {
    const TABLE: &'static str = "wishlists";

    /// `client` should carry the shopper's access token.
    #[must_use]
    pub const fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl WishlistSync for RemoteWishlistSync {
    #[instrument(skip(self), fields(user_id = %user, product_id = %product))]
    async fn add(&self, user: &UserId, product: &ProductId) -> Result<(), BackendError> {
        let row = WishlistRow {
            user_id: user,
            product_id: product,
        };
        let _: Vec<serde_json::Value> = self.client.insert(Self::TABLE, &[row]).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(user_id = %user, product_id = %product))]
    async fn remove(&self, user: &UserId, product: &ProductId) -> Result<(), BackendError> {
        let user_filter = format!("eq.{user}");
        let product_filter = format!("eq.{product}");
        self.client
            .delete(
                Self::TABLE,
                &[
                    ("user_id", user_filter.as_str()),
                    ("product_id", product_filter.as_str()),
                ],
            )
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_row_shape() {
        let user = UserId::new(uuid::Uuid::nil());
        let product = ProductId::new("4");
        let row = WishlistRow {
            user_id: &user,
            product_id: &product,
        };
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            serde_json::json!({
                "user_id": "00000000-0000-0000-0000-000000000000",
                "product_id": "4",
            })
        );
    }
}
