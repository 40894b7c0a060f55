//! Catalog browsing commands.
//!
//! # Usage
//!
//! ```bash
//! sf-cli products list --category Books --min 10 --max 50 --query novel
//! sf-cli products list --sort rating
//! sf-cli products show 3
//! sf-cli products featured
//! sf-cli products categories
//! ```

use clap::Subcommand;
use rust_decimal::Decimal;
use tracing::info;

use storefront::AppError;
use storefront::AppState;
use storefront::catalog::{
    CatalogQuery, CategoryFilter, PriceRange, SortKey, categories, filter_products, price_bounds,
};

use super::{find_product, product_line};

#[derive(Subcommand)]
pub enum ProductsAction {
    /// List products, filtered and sorted
    List {
        /// Category name, or "All"
        #[arg(short, long, default_value = CategoryFilter::ALL_LABEL)]
        category: String,

        /// Lowest price to include
        #[arg(long)]
        min: Option<Decimal>,

        /// Highest price to include
        #[arg(long)]
        max: Option<Decimal>,

        /// Text to look for in name, description or category
        #[arg(short, long, default_value = "")]
        query: String,

        /// `featured`, `price-low`, `price-high` or `rating`
        #[arg(short, long, default_value = "featured")]
        sort: SortKey,
    },
    /// Show one product
    Show {
        /// Product ID
        id: String,
    },
    /// List featured products
    Featured,
    /// List categories and the catalog price range
    Categories,
}

pub async fn run(state: &AppState, action: ProductsAction) -> Result<(), AppError> {
    let catalog = state.catalog();

    match action {
        ProductsAction::List {
            category,
            min,
            max,
            query,
            sort,
        } => {
            let products = catalog.list_products().await?;
            let query = CatalogQuery {
                category: CategoryFilter::parse(&category),
                price_range: PriceRange::new(
                    min.unwrap_or(Decimal::ZERO),
                    max.unwrap_or(Decimal::MAX),
                ),
                text: query,
                sort,
            };

            let shown = filter_products(&products, &query);
            info!(
                "Showing {} of {} products ({}, sorted by {})",
                shown.len(),
                products.len(),
                query.category,
                query.sort.as_str()
            );
            for product in &shown {
                info!("{}", product_line(product));
            }
        }
        ProductsAction::Show { id } => {
            let product = find_product(catalog, &id).await?;
            info!("{}", product_line(&product));
            info!("{}", product.description);
        }
        ProductsAction::Featured => {
            for product in catalog.featured_products().await? {
                info!("{}", product_line(&product));
            }
        }
        ProductsAction::Categories => {
            let products = catalog.list_products().await?;
            for category in categories(&products) {
                info!("{category}");
            }
            if let Some(range) = price_bounds(&products) {
                info!("Price range: ${} - ${}", range.min, range.max);
            }
        }
    }
    Ok(())
}
