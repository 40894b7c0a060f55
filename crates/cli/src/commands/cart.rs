//! Cart and saved-for-later commands.
//!
//! # Usage
//!
//! ```bash
//! sf-cli cart add 7 -q 2
//! sf-cli cart update 7 3
//! sf-cli cart save 7
//! sf-cli cart restore 7
//! sf-cli cart remove 7
//! sf-cli cart clear
//! sf-cli cart show
//! ```
//!
//! State lives in `STOREFRONT_STATE_DIR`.

use clap::Subcommand;
use tracing::info;

use storefront::AppError;
use storefront::AppState;
use storefront::checkout::PricingPolicy;
use storefront_core::ProductId;

use super::{find_product, product_line, report_events};

#[derive(Subcommand)]
pub enum CartAction {
    /// Show cart lines, saved items and totals
    Show,
    /// Add a product to the cart
    Add {
        /// Product ID
        id: String,

        /// How many to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: String,
    },
    /// Set the quantity of a cart line
    Update {
        /// Product ID
        id: String,

        /// New quantity (at least 1)
        quantity: u32,
    },
    /// Move a cart line to saved-for-later
    Save {
        /// Product ID
        id: String,
    },
    /// Move a saved item back into the cart
    Restore {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

pub async fn run(state: &AppState, action: CartAction) -> Result<(), AppError> {
    let mut store = state.open_cart_store()?;

    match action {
        CartAction::Show => {
            if store.lines().is_empty() {
                info!("Your cart is empty");
            }
            for line in store.lines() {
                info!(
                    "{} x{} = {}",
                    product_line(&line.product),
                    line.quantity,
                    line.line_total()
                );
            }
            for saved in store.saved() {
                info!("saved: {}", product_line(&saved.product));
            }

            let summary = PricingPolicy::cart_preview().summarize(store.subtotal());
            info!(
                "{} item(s): subtotal {}, shipping {}, tax {}, total {}",
                store.total_items(),
                summary.subtotal,
                summary.shipping,
                summary.tax,
                summary.total
            );
        }
        CartAction::Add { id, quantity } => {
            let product = find_product(state.catalog(), &id).await?;
            store.add_to_cart(&product, quantity)?;
        }
        CartAction::Remove { id } => store.remove_from_cart(&ProductId::new(id))?,
        CartAction::Update { id, quantity } => {
            store.update_quantity(&ProductId::new(id), quantity)?;
        }
        CartAction::Save { id } => store.save_for_later(&ProductId::new(id))?,
        CartAction::Restore { id } => store.move_to_cart(&ProductId::new(id))?,
        CartAction::Clear => store.clear_cart()?,
    }

    report_events(&mut store);
    Ok(())
}
