//! End-to-end shopping flow over the public API: browse the seed catalog,
//! fill a file-backed cart across sessions, then check out.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use storefront::cart::{CartEvent, CartStore, FileStorage, WishlistChange};
use storefront::catalog::{
    CatalogQuery, CatalogSource, CategoryFilter, SortKey, StaticCatalog, filter_products,
};
use storefront::checkout::{
    CheckoutForm, MockOrderSubmitter, PricingPolicy, ShippingAddress, place_order,
};
use storefront::config::StorefrontConfig;
use storefront::AppState;
use storefront_core::{OrderId, PaymentMethod, Price, ProductId, UserId};

fn shipping() -> ShippingAddress {
    ShippingAddress {
        first_name: "Grace".to_string(),
        last_name: "Hopper".to_string(),
        email: "grace@example.com".to_string(),
        address: "1 Compiler Ct".to_string(),
        city: "Arlington".to_string(),
        state: "VA".to_string(),
        postal_code: "22201".to_string(),
        ..ShippingAddress::default()
    }
}

#[tokio::test]
async fn test_browse_fill_cart_and_check_out() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = StaticCatalog::seed();

    // Cheapest electronics first.
    let products = catalog.list_products().await.unwrap();
    let query = CatalogQuery {
        category: CategoryFilter::parse("Electronics"),
        sort: SortKey::parse("price-low"),
        ..CatalogQuery::default()
    };
    let electronics = filter_products(&products, &query);
    let ids: Vec<&str> = electronics.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, ["6", "11", "9", "1", "2"]);

    // First session: add items and wishlist one.
    {
        let mut store = CartStore::open(FileStorage::open(dir.path()).unwrap());
        store.add_to_cart(&electronics[0], 2).unwrap();
        store.add_to_cart(&electronics[2], 1).unwrap();
        let change = store.add_to_wishlist(&electronics[4]).await.unwrap();
        assert_eq!(change, WishlistChange::Added);
    }

    // Second session picks up where the first left off.
    let mut store = CartStore::open(FileStorage::open(dir.path()).unwrap());
    assert_eq!(store.total_items(), 3);
    assert_eq!(store.subtotal(), Price::from_cents(2599 * 2 + 7999));
    assert!(store.is_in_wishlist(&ProductId::new("2")));

    let order_id = OrderId::random();
    let mut submitter = MockOrderSubmitter::new();
    submitter
        .expect_submit()
        .once()
        .returning(move |_| Ok(order_id));

    let form = CheckoutForm {
        shipping: shipping(),
        payment_method: PaymentMethod::PayPal,
        card: None,
    };
    let confirmation = place_order(
        &mut store,
        Some(UserId::random()),
        &form,
        &PricingPolicy::checkout(),
        &submitter,
    )
    .await
    .unwrap();

    // 131.97 ships free above 100; 7% tax is 9.2379.
    assert_eq!(confirmation.summary.shipping, Price::ZERO);
    assert_eq!(confirmation.summary.tax, Price::from_cents(924));
    assert_eq!(confirmation.summary.total, Price::from_cents(14121));
    assert!(
        store
            .drain_events()
            .contains(&CartEvent::OrderPlaced { order_id })
    );

    let reopened = CartStore::open(FileStorage::open(dir.path()).unwrap());
    assert!(reopened.lines().is_empty());
    assert_eq!(reopened.wishlist().len(), 1);
}

#[tokio::test]
async fn test_app_state_without_identity_cannot_submit_orders() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().display().to_string();
    let config = StorefrontConfig::from_lookup(|key| {
        (key == "STOREFRONT_STATE_DIR").then(|| state_dir.clone())
    })
    .unwrap();

    let state = AppState::with_catalog(config, Arc::new(StaticCatalog::seed()), None);
    assert!(state.order_submitter().is_none());
    assert_eq!(state.catalog().featured_products().await.unwrap().len(), 4);
}
