//! Storefront CLI - browse the catalog and manage a local cart.
//!
//! # Usage
//!
//! ```bash
//! # Browse
//! sf-cli products list --category Electronics --sort price-low
//! sf-cli products show 5
//!
//! # Cart
//! sf-cli cart add 7 -q 2
//! sf-cli cart save 7
//! sf-cli cart restore 7
//! sf-cli cart show
//!
//! # Wishlist (toggle adds or removes)
//! sf-cli wishlist toggle 4
//!
//! # Checkout (needs a backend and a signed-in shopper)
//! sf-cli checkout --first-name Ada --last-name Lovelace ... --payment paypal
//! ```
//!
//! # Commands
//!
//! - `products` - List, show and filter catalog products
//! - `cart` - Add, remove, update, save for later, restore, clear
//! - `wishlist` - Show, toggle, remove
//! - `checkout` - Place an order for the current cart
//!
//! Configuration comes from `STOREFRONT_*` environment variables (see
//! `storefront::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use storefront::config::{LogFormat, StorefrontConfig};
use storefront::{AppError, AppState};

mod commands;

use commands::cart::CartAction;
use commands::checkout::CheckoutArgs;
use commands::products::ProductsAction;
use commands::wishlist::WishlistAction;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Storefront cart and catalog tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Manage the cart and saved-for-later items
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Place an order for the current cart
    Checkout(CheckoutArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = StorefrontConfig::from_env();

    init_tracing(
        config
            .as_ref()
            .map_or(LogFormat::default(), |config| config.log_format),
    );

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "{}", e.user_message());
        std::process::exit(1);
    }
}

/// Initialize tracing with `EnvFilter`, defaulting to info for our crates.
fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront=info,sf_cli=info".into());

    let json = format == LogFormat::Json;
    tracing_subscriber::registry()
        .with(env_filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer().without_time()))
        .init();
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Products { action } => commands::products::run(&state, action).await,
        Commands::Cart { action } => commands::cart::run(&state, action).await,
        Commands::Wishlist { action } => commands::wishlist::run(&state, action).await,
        Commands::Checkout(args) => commands::checkout::run(&state, args).await,
    }
}
