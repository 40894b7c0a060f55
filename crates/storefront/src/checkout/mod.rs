//! Checkout: form validation, pricing and order placement.
//!
//! # Flow
//!
//! 1. The shopper must be signed in and have a non-empty cart.
//! 2. [`CheckoutForm::validate`] checks required fields and keeps only the
//!    last four card digits.
//! 3. The cart is frozen into an [`OrderDraft`] and handed to an
//!    [`OrderSubmitter`].
//! 4. On success the cart is cleared; saved items and the wishlist stay.

mod form;
mod pricing;
mod submit;

pub use form::{CardDetails, CheckoutForm, DEFAULT_COUNTRY, PaymentDetails, ShippingAddress};
pub use pricing::{OrderSummary, PricingPolicy};
pub use submit::{MockOrderSubmitter, OrderDraft, OrderItem, OrderSubmitter, RemoteOrderSubmitter};

use thiserror::Error;
use tracing::{info, instrument, warn};

use storefront_core::{OrderId, OrderStatus, UserId};

use crate::backend::BackendError;
use crate::cart::{CartEvent, CartStore, StoreError};

/// Why an order could not be placed.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign in to proceed with checkout")]
    Unauthenticated,

    #[error("your cart is empty")]
    EmptyCart,

    #[error("missing required fields: {}", .0.join(", "))]
    InvalidForm(Vec<&'static str>),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("order submission failed: {0}")]
    Transport(#[from] BackendError),
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderConfirmation {
    pub order_id: OrderId,
    pub summary: OrderSummary,
}

/// Place an order for everything in the cart.
///
/// # Errors
///
/// - `Unauthenticated` without a signed-in user
/// - `EmptyCart` if there is nothing to buy
/// - `InvalidForm` listing the missing fields
/// - `Transport` if submission fails; the cart is left as it was
#[instrument(skip_all, fields(lines = store.lines().len()))]
pub async fn place_order(
    store: &mut CartStore,
    user: Option<UserId>,
    form: &CheckoutForm,
    policy: &PricingPolicy,
    submitter: &dyn OrderSubmitter,
) -> Result<OrderConfirmation, CheckoutError> {
    let user_id = user.ok_or(CheckoutError::Unauthenticated)?;
    if store.lines().is_empty() {
        return Err(CheckoutError::EmptyCart);
    }
    let payment = form.validate().map_err(CheckoutError::InvalidForm)?;

    let summary = policy.summarize(store.subtotal());
    let draft = OrderDraft {
        user_id,
        status: OrderStatus::Pending,
        items: store.lines().iter().map(OrderItem::from).collect(),
        summary,
        shipping_address: form.shipping.clone(),
        payment,
    };

    let order_id = submitter.submit(&draft).await?;
    info!(order_id = %order_id, total = %summary.total, "Order placed");

    // Order is recorded; a failed local write is only logged.
    if let Err(e) = store.clear_cart() {
        warn!(order_id = %order_id, error = %e, "Could not persist cleared cart");
    }
    store.push_event(CartEvent::OrderPlaced { order_id });

    Ok(OrderConfirmation { order_id, summary })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::cart::MemoryStorage;
    use crate::checkout::form::tests::{card, shipping};
    use crate::test_support::product;
    use storefront_core::{PaymentMethod, Price};

    fn form() -> CheckoutForm {
        CheckoutForm {
            shipping: shipping(),
            payment_method: PaymentMethod::CreditCard,
            card: Some(card()),
        }
    }

    async fn stocked_store() -> CartStore {
        let mut store = CartStore::open(MemoryStorage::new());
        store.add_to_cart(&product("a", 4599, "Sports"), 2).unwrap();
        store.add_to_cart(&product("b", 1000, "Books"), 1).unwrap();
        store.save_for_later(&product("b", 1000, "Books").id).unwrap();
        store
            .add_to_wishlist(&product("c", 2000, "Books"))
            .await
            .unwrap();
        store.drain_events();
        store
    }

    fn unreachable_submitter() -> MockOrderSubmitter {
        let mut submitter = MockOrderSubmitter::new();
        submitter.expect_submit().never();
        submitter
    }

    #[tokio::test]
    async fn test_requires_sign_in() {
        let mut store = stocked_store().await;
        let result = place_order(
            &mut store,
            None,
            &form(),
            &PricingPolicy::checkout(),
            &unreachable_submitter(),
        )
        .await;
        assert!(matches!(result, Err(CheckoutError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_rejects_empty_cart() {
        let mut store = CartStore::open(MemoryStorage::new());
        let result = place_order(
            &mut store,
            Some(UserId::random()),
            &form(),
            &PricingPolicy::checkout(),
            &unreachable_submitter(),
        )
        .await;
        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_rejects_missing_fields() {
        let mut store = stocked_store().await;
        let form = CheckoutForm {
            shipping: ShippingAddress {
                last_name: String::new(),
                ..shipping()
            },
            ..form()
        };
        let result = place_order(
            &mut store,
            Some(UserId::random()),
            &form,
            &PricingPolicy::checkout(),
            &unreachable_submitter(),
        )
        .await;
        match result {
            Err(CheckoutError::InvalidForm(fields)) => assert_eq!(fields, ["last name"]),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(store.lines().len(), 1);
    }

    #[tokio::test]
    async fn test_success_clears_cart_only() {
        let user = UserId::random();
        let order_id = OrderId::random();
        let mut submitter = MockOrderSubmitter::new();
        submitter
            .expect_submit()
            .withf(move |draft| {
                draft.user_id == user
                    && draft.status == OrderStatus::Pending
                    && draft.items.len() == 1
                    && draft.items[0].quantity == 2
                    && draft.payment.last_four.as_deref() == Some("4242")
            })
            .once()
            .returning(move |_| Ok(order_id));

        let mut store = stocked_store().await;
        let confirmation = place_order(
            &mut store,
            Some(user),
            &form(),
            &PricingPolicy::checkout(),
            &submitter,
        )
        .await
        .unwrap();

        assert_eq!(confirmation.order_id, order_id);
        assert_eq!(confirmation.summary.subtotal, Price::from_cents(9198));
        assert_eq!(confirmation.summary.total, Price::from_cents(10842));
        assert!(store.lines().is_empty());
        assert_eq!(store.saved().len(), 1);
        assert_eq!(store.wishlist().len(), 1);
        assert_eq!(
            store.drain_events(),
            [CartEvent::CartCleared, CartEvent::OrderPlaced { order_id }]
        );
    }

    #[tokio::test]
    async fn test_transport_failure_keeps_cart() {
        let mut submitter = MockOrderSubmitter::new();
        submitter.expect_submit().once().returning(|_| {
            Err(BackendError::Api {
                status: 500,
                code: None,
                message: "boom".to_string(),
            })
        });

        let mut store = stocked_store().await;
        let result = place_order(
            &mut store,
            Some(UserId::random()),
            &form(),
            &PricingPolicy::checkout(),
            &submitter,
        )
        .await;

        assert!(matches!(result, Err(CheckoutError::Transport(_))));
        assert_eq!(store.lines().len(), 1);
    }
}
