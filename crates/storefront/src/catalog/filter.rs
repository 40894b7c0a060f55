//! Listing page filter and sort.
//!
//! Pure functions over a product slice: the input is never mutated and the
//! same query always yields the same output.

use std::collections::HashSet;
use std::convert::Infallible;

use rust_decimal::Decimal;

use storefront_core::{Price, Product};

use super::CategoryFilter;

/// Inclusive price range. `min > max` is legal and matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl PriceRange {
    /// Create a range; bounds are not reordered.
    #[must_use]
    pub const fn new(min: Decimal, max: Decimal) -> Self {
        Self { min, max }
    }

    /// Whether `price` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, price: Price) -> bool {
        let amount = price.amount();
        self.min <= amount && amount <= self.max
    }
}

impl Default for PriceRange {
    fn default() -> Self {
        Self::new(Decimal::ZERO, Decimal::MAX)
    }
}

/// Listing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    /// Catalog order, untouched.
    #[default]
    Featured,
    /// Cheapest first.
    PriceAscending,
    /// Most expensive first.
    PriceDescending,
    /// Best rated first.
    RatingDescending,
}

impl SortKey {
    /// Parse the listing page's sort value. Unknown values fall back to
    /// `Featured`.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        match value {
            "price-low" => Self::PriceAscending,
            "price-high" => Self::PriceDescending,
            "rating" => Self::RatingDescending,
            _ => Self::Featured,
        }
    }

    /// The value [`SortKey::parse`] accepts for this key.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAscending => "price-low",
            Self::PriceDescending => "price-high",
            Self::RatingDescending => "rating",
        }
    }
}

impl std::str::FromStr for SortKey {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

/// Everything the listing page filters and sorts by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogQuery {
    pub category: CategoryFilter,
    pub price_range: PriceRange,
    /// Free-text search; empty means no text filter.
    pub text: String,
    pub sort: SortKey,
}

/// Apply a [`CatalogQuery`] to a product collection.
///
/// Filters by category, then price, then text (case-insensitive substring of
/// name, description or category), then sorts. All sorts are stable, so ties
/// keep their catalog order.
#[must_use]
pub fn filter_products(products: &[Product], query: &CatalogQuery) -> Vec<Product> {
    let needle = query.text.to_lowercase();

    let mut result: Vec<Product> = products
        .iter()
        .filter(|p| query.category.matches(&p.category))
        .filter(|p| query.price_range.contains(p.price))
        .filter(|p| needle.is_empty() || matches_text(p, &needle))
        .cloned()
        .collect();

    match query.sort {
        SortKey::Featured => {}
        SortKey::PriceAscending => result.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDescending => result.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::RatingDescending => {
            result.sort_by(|a, b| b.normalized_rating().total_cmp(&a.normalized_rating()));
        }
    }

    result
}

fn matches_text(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product.category.to_lowercase().contains(needle)
}

/// Category labels for the filter sidebar: `"All"` followed by each distinct
/// category in first-seen order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen = HashSet::new();
    std::iter::once(CategoryFilter::ALL_LABEL.to_string())
        .chain(
            products
                .iter()
                .filter(|p| seen.insert(p.category.as_str()))
                .map(|p| p.category.clone()),
        )
        .collect()
}

/// Initial slider range: whole-dollar floor of the cheapest price to ceiling
/// of the dearest. `None` for an empty catalog.
#[must_use]
pub fn price_bounds(products: &[Product]) -> Option<PriceRange> {
    let min = products.iter().map(|p| p.price).min()?;
    let max = products.iter().map(|p| p.price).max()?;
    Some(PriceRange::new(min.amount().floor(), max.amount().ceil()))
}
