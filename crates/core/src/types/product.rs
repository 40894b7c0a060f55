//! Catalog product.

use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::price::Price;

/// A product as returned by a catalog source.
///
/// Products are immutable once fetched: the cart and wishlist hold copies, so
/// a persisted cart keeps rendering even if the catalog entry later changes.
/// Field names on the wire follow the backend rows (`inStock`, `fastDelivery`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique catalog identifier.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Plain text description.
    pub description: String,
    /// Unit price.
    pub price: Price,
    /// Image reference (URL or asset path).
    pub image: String,
    /// Category name, compared case-sensitively.
    pub category: String,
    /// Average review rating, 0.0 to 5.0.
    pub rating: f64,
    /// Whether the product can currently be ordered.
    pub in_stock: bool,
    /// Eligible for fast delivery. Absent in older rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_delivery: Option<bool>,
}

impl Product {
    /// Highest rating a product can carry.
    pub const MAX_RATING: f64 = 5.0;

    /// Rating clamped into `0.0..=5.0`, with NaN treated as unrated.
    #[must_use]
    pub fn normalized_rating(&self) -> f64 {
        if self.rating.is_nan() {
            0.0
        } else {
            self.rating.clamp(0.0, Self::MAX_RATING)
        }
    }

    /// Whether fast delivery is offered.
    #[must_use]
    pub fn has_fast_delivery(&self) -> bool {
        self.fast_delivery.unwrap_or(false)
    }
}
