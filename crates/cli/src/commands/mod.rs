//! Subcommand implementations.

pub mod cart;
pub mod checkout;
pub mod products;
pub mod wishlist;

use storefront::cart::CartStore;
use storefront::catalog::CatalogSource;
use storefront::AppError;
use storefront_core::{Product, ProductId};

/// Log queued store events, the CLI's stand-in for toasts.
pub fn report_events(store: &mut CartStore) {
    for event in store.drain_events() {
        match event.description() {
            Some(description) => tracing::info!("{} - {description}", event.title()),
            None => tracing::info!("{}", event.title()),
        }
    }
}

/// Look a product up, turning absence into `AppError::NotFound`.
pub async fn find_product(catalog: &dyn CatalogSource, id: &str) -> Result<Product, AppError> {
    catalog
        .get_product(&ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Product {id}")))
}

/// One-line product summary.
pub fn product_line(product: &Product) -> String {
    let stock = if product.in_stock { "" } else { " [out of stock]" };
    let fast = if product.has_fast_delivery() {
        " [fast delivery]"
    } else {
        ""
    };
    format!(
        "{:>4}  {:<40} {:>9}  {:<18} {:.1}/5{stock}{fast}",
        product.id,
        product.name,
        product.price.to_string(),
        product.category,
        product.normalized_rating(),
    )
}
