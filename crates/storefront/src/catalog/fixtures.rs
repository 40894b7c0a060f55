//! Built-in seed catalog.
//!
//! Used when no backend is configured, and as a deterministic catalog for
//! tests and demos.

use async_trait::async_trait;

use storefront_core::{Price, Product, ProductId};

use super::{CatalogSource, CategoryFilter};
use crate::backend::BackendError;

/// Minimum rating for the static home page selection.
const FEATURED_MIN_RATING: f64 = 4.5;
/// How many products the static home page features.
const FEATURED_LIMIT: usize = 4;

/// In-memory catalog over a fixed product list.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    products: Vec<Product>,
}

impl StaticCatalog {
    /// A catalog over the given products, kept in the given order.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The twelve-product seed catalog.
    #[must_use]
    pub fn seed() -> Self {
        Self::new(SEED.iter().map(SeedRow::to_product).collect())
    }

    /// Borrow the products.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::seed()
    }
}

#[async_trait]
impl CatalogSource for StaticCatalog {
    async fn list_products(&self) -> Result<Vec<Product>, BackendError> {
        Ok(self.products.clone())
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, BackendError> {
        Ok(self.products.iter().find(|p| &p.id == id).cloned())
    }

    async fn products_by_category(
        &self,
        category: &CategoryFilter,
    ) -> Result<Vec<Product>, BackendError> {
        Ok(self
            .products
            .iter()
            .filter(|p| category.matches(&p.category))
            .cloned()
            .collect())
    }

    async fn featured_products(&self) -> Result<Vec<Product>, BackendError> {
        Ok(self
            .products
            .iter()
            .filter(|p| p.rating >= FEATURED_MIN_RATING)
            .take(FEATURED_LIMIT)
            .cloned()
            .collect())
    }
}

// =============================================================================
// Seed Data
// =============================================================================

struct SeedRow {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    cents: u32,
    category: &'static str,
    rating: f64,
    in_stock: bool,
    fast_delivery: Option<bool>,
}

impl SeedRow {
    fn to_product(&self) -> Product {
        Product {
            id: ProductId::new(self.id),
            name: self.name.to_string(),
            description: self.description.to_string(),
            price: Price::from_cents(self.cents),
            image: "/placeholder.svg".to_string(),
            category: self.category.to_string(),
            rating: self.rating,
            in_stock: self.in_stock,
            fast_delivery: self.fast_delivery,
        }
    }
}

const SEED: &[SeedRow] = &[
    SeedRow {
        id: "1",
        name: "Premium Wireless Headphones",
        description: "Noise-cancelling over-ear headphones with a 30-hour battery.",
        cents: 15999,
        category: "Electronics",
        rating: 4.8,
        in_stock: true,
        fast_delivery: None,
    },
    SeedRow {
        id: "2",
        name: "Smart Watch Series 5",
        description: "Fitness tracking, notifications and a bright always-on display.",
        cents: 29999,
        category: "Electronics",
        rating: 4.5,
        in_stock: true,
        fast_delivery: None,
    },
    SeedRow {
        id: "3",
        name: "Organic Cotton T-Shirt",
        description: "Soft everyday tee made from certified organic cotton.",
        cents: 2499,
        category: "Clothing",
        rating: 4.2,
        in_stock: true,
        fast_delivery: None,
    },
    SeedRow {
        id: "4",
        name: "Stainless Steel Water Bottle",
        description: "Vacuum-insulated bottle, cold for 24 hours or hot for 12.",
        cents: 3599,
        category: "Home & Kitchen",
        rating: 4.9,
        in_stock: true,
        fast_delivery: None,
    },
    SeedRow {
        id: "5",
        name: "Professional Blender",
        description: "1000W motor for smoothies, soups and nut butters.",
        cents: 12999,
        category: "Home & Kitchen",
        rating: 4.7,
        in_stock: true,
        fast_delivery: Some(true),
    },
    SeedRow {
        id: "6",
        name: "Wireless Charging Pad",
        description: "Slim Qi charger for phones and earbuds.",
        cents: 2599,
        category: "Electronics",
        rating: 4.3,
        in_stock: true,
        fast_delivery: Some(true),
    },
    SeedRow {
        id: "7",
        name: "Premium Yoga Mat",
        description: "Non-slip, eco-friendly mat for yoga and floor workouts.",
        cents: 4599,
        category: "Sports & Fitness",
        rating: 4.6,
        in_stock: true,
        fast_delivery: None,
    },
    SeedRow {
        id: "8",
        name: "Bestselling Fiction Novel",
        description: "The latest page-turner from an award-winning author.",
        cents: 1899,
        category: "Books",
        rating: 4.4,
        in_stock: true,
        fast_delivery: None,
    },
    SeedRow {
        id: "9",
        name: "Bluetooth Portable Speaker",
        description: "Waterproof speaker with a 24-hour battery.",
        cents: 7999,
        category: "Electronics",
        rating: 4.5,
        in_stock: true,
        fast_delivery: Some(true),
    },
    SeedRow {
        id: "10",
        name: "Cast Iron Skillet",
        description: "Pre-seasoned skillet for stovetop, oven or campfire.",
        cents: 3299,
        category: "Home & Kitchen",
        rating: 4.8,
        in_stock: true,
        fast_delivery: None,
    },
    SeedRow {
        id: "11",
        name: "Smartphone Stand and Wireless Charger",
        description: "Keeps your phone upright while it charges.",
        cents: 4999,
        category: "Electronics",
        rating: 4.2,
        in_stock: false,
        fast_delivery: None,
    },
    SeedRow {
        id: "12",
        name: "Plant-Based Protein Powder",
        description: "25g of complete protein per serving, nothing artificial.",
        cents: 3999,
        category: "Food & Beverage",
        rating: 4.0,
        in_stock: true,
        fast_delivery: Some(true),
    },
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_seed_catalog_has_unique_ids() {
        let products = StaticCatalog::seed().list_products().await.unwrap();
        assert_eq!(products.len(), 12);

        let mut seen: Vec<&str> = ids(&products);
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), 12);
    }

    #[tokio::test]
    async fn test_get_product() {
        let catalog = StaticCatalog::seed();
        let found = catalog.get_product(&ProductId::new("8")).await.unwrap();
        assert_eq!(found.unwrap().category, "Books");

        let missing = catalog.get_product(&ProductId::new("999")).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_products_by_category() {
        let catalog = StaticCatalog::seed();
        let kitchen = catalog
            .products_by_category(&CategoryFilter::parse("Home & Kitchen"))
            .await
            .unwrap();
        assert_eq!(ids(&kitchen), ["4", "5", "10"]);

        let all = catalog
            .products_by_category(&CategoryFilter::All)
            .await
            .unwrap();
        assert_eq!(all.len(), 12);
    }

    #[tokio::test]
    async fn test_featured_products_are_first_four_highly_rated() {
        let featured = StaticCatalog::seed().featured_products().await.unwrap();
        assert_eq!(ids(&featured), ["1", "2", "4", "5"]);
    }
}
