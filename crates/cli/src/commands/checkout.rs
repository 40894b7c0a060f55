//! Checkout command.
//!
//! # Usage
//!
//! ```bash
//! sf-cli checkout \
//!     --first-name Ada --last-name Lovelace --email ada@example.com \
//!     --address "1 Analytical Way" --city Cambridge --state MA --postal-code 02139 \
//!     --card-name "Ada Lovelace" --card-number 4242424242424242 \
//!     --card-expiry 12/30 --card-cvc 123
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_BACKEND_URL` / `STOREFRONT_BACKEND_ANON_KEY` - where orders go
//! - `STOREFRONT_USER_ID` / `STOREFRONT_ACCESS_TOKEN` - the signed-in shopper

use clap::Args;
use secrecy::SecretString;
use tracing::info;

use storefront::AppError;
use storefront::AppState;
use storefront::checkout::{
    CardDetails, CheckoutError, CheckoutForm, DEFAULT_COUNTRY, PricingPolicy, ShippingAddress,
    place_order,
};
use storefront::config::ConfigError;
use storefront_core::PaymentMethod;

use super::report_events;

#[derive(Args)]
pub struct CheckoutArgs {
    #[arg(long, default_value = "")]
    first_name: String,
    #[arg(long, default_value = "")]
    last_name: String,
    #[arg(long, default_value = "")]
    email: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    address: String,
    #[arg(long, default_value = "")]
    city: String,
    #[arg(long, default_value = "")]
    state: String,
    #[arg(long, default_value = "")]
    postal_code: String,
    #[arg(long, default_value = DEFAULT_COUNTRY)]
    country: String,

    /// `credit-card` or `paypal`
    #[arg(long, default_value = "credit-card")]
    payment: PaymentMethod,
    #[arg(long)]
    card_name: Option<String>,
    #[arg(long)]
    card_number: Option<String>,
    #[arg(long)]
    card_expiry: Option<String>,
    #[arg(long)]
    card_cvc: Option<String>,
}

impl CheckoutArgs {
    fn into_form(self) -> CheckoutForm {
        let has_card = self.card_name.is_some()
            || self.card_number.is_some()
            || self.card_expiry.is_some()
            || self.card_cvc.is_some();

        let card = has_card.then(|| CardDetails {
            name: self.card_name.unwrap_or_default(),
            number: SecretString::from(self.card_number.unwrap_or_default()),
            expiry: self.card_expiry.unwrap_or_default(),
            cvc: SecretString::from(self.card_cvc.unwrap_or_default()),
        });

        CheckoutForm {
            shipping: ShippingAddress {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone: self.phone,
                address: self.address,
                city: self.city,
                state: self.state,
                postal_code: self.postal_code,
                country: self.country,
            },
            payment_method: self.payment,
            card,
        }
    }
}

pub async fn run(state: &AppState, args: CheckoutArgs) -> Result<(), AppError> {
    let Some(submitter) = state.order_submitter() else {
        return Err(match state.user_id() {
            None => CheckoutError::Unauthenticated.into(),
            Some(_) => ConfigError::MissingEnvVar("STOREFRONT_BACKEND_URL".to_string()).into(),
        });
    };

    let mut store = state.open_cart_store()?;
    let form = args.into_form();

    let confirmation = place_order(
        &mut store,
        state.user_id(),
        &form,
        &PricingPolicy::checkout(),
        submitter.as_ref(),
    )
    .await?;

    report_events(&mut store);
    let summary = confirmation.summary;
    info!(
        "Order {}: subtotal {}, shipping {}, tax {}, total {}",
        confirmation.order_id, summary.subtotal, summary.shipping, summary.tax, summary.total
    );
    Ok(())
}
