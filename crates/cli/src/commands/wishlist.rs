//! Wishlist commands.

use clap::Subcommand;
use tracing::info;

use storefront::AppError;
use storefront::AppState;
use storefront_core::ProductId;

use super::{find_product, product_line, report_events};

#[derive(Subcommand)]
pub enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Add a product, or remove it if already wishlisted
    Toggle {
        /// Product ID
        id: String,
    },
    /// Remove a product from the wishlist
    Remove {
        /// Product ID
        id: String,
    },
}

pub async fn run(state: &AppState, action: WishlistAction) -> Result<(), AppError> {
    let mut store = state.open_cart_store()?;

    match action {
        WishlistAction::Show => {
            if store.wishlist().is_empty() {
                info!("Your wishlist is empty");
            }
            for product in store.wishlist() {
                let marker = if store.is_in_cart(&product.id) {
                    " (in cart)"
                } else {
                    ""
                };
                info!("{}{marker}", product_line(product));
            }
        }
        WishlistAction::Toggle { id } => {
            let product = find_product(state.catalog(), &id).await?;
            store.add_to_wishlist(&product).await?;
        }
        WishlistAction::Remove { id } => {
            store.remove_from_wishlist(&ProductId::new(id)).await?;
        }
    }

    report_events(&mut store);
    Ok(())
}
