//! Order snapshot and submission.

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use storefront_core::{OrderId, OrderStatus, Price, ProductId, UserId};

use super::form::{PaymentDetails, ShippingAddress};
use super::pricing::OrderSummary;
use crate::backend::{BackendClient, BackendError};
use crate::cart::CartLine;

/// One cart line frozen at order time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub unit_price: Price,
}

impl From<&CartLine> for OrderItem {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product.id.clone(),
            quantity: line.quantity,
            unit_price: line.product.price,
        }
    }
}

/// Everything needed to record an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderDraft {
    pub user_id: UserId,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    pub summary: OrderSummary,
    pub shipping_address: ShippingAddress,
    pub payment: PaymentDetails,
}

/// Records orders somewhere durable.
#[automock]
#[async_trait]
pub trait OrderSubmitter: Send + Sync {
    /// Store the order and its items, returning the new order's ID.
    async fn submit(&self, draft: &OrderDraft) -> Result<OrderId, BackendError>;
}

/// [`OrderSubmitter`] over the backend `orders` and `order_items` tables.
#[derive(Debug, Clone)]
pub struct RemoteOrderSubmitter {
    client: BackendClient,
}

#[derive(Serialize)]
struct OrderRow<'a> {
    user_id: UserId,
    status: OrderStatus,
    total_amount: Price,
    shipping_address: &'a ShippingAddress,
    payment_details: &'a PaymentDetails,
}

#[derive(Deserialize)]
struct InsertedOrder {
    id: OrderId,
}

#[derive(Serialize)]
struct OrderItemRow<'a> {
    order_id: OrderId,
    product_id: &'a ProductId,
    quantity: u32,
    price: Price,
}

impl<'a> OrderRow<'a> {
    /// `total_amount` is the full charge: subtotal, shipping and tax.
    fn from_draft(draft: &'a OrderDraft) -> Self {
        Self {
            user_id: draft.user_id,
            status: draft.status,
            total_amount: draft.summary.total,
            shipping_address: &draft.shipping_address,
            payment_details: &draft.payment,
        }
    }
}

fn item_rows(order_id: OrderId, items: &[OrderItem]) -> Vec<OrderItemRow<'_>> {
    items
        .iter()
        .map(|item| OrderItemRow {
            order_id,
            product_id: &item.product_id,
            quantity: item.quantity,
            price: item.unit_price,
        })
        .collect()
}

impl RemoteOrderSubmitter {
    /// `client` should carry the shopper's access token.
    #[must_use]
    pub const fn new(client: BackendClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl OrderSubmitter for RemoteOrderSubmitter {
    #[instrument(skip(self, draft), fields(user_id = %draft.user_id, items = draft.items.len()))]
    async fn submit(&self, draft: &OrderDraft) -> Result<OrderId, BackendError> {
        let inserted: InsertedOrder = self
            .client
            .insert_one("orders", &OrderRow::from_draft(draft))
            .await?;

        let rows = item_rows(inserted.id, &draft.items);
        let _: Vec<serde_json::Value> = self.client.insert("order_items", &rows).await?;

        info!(order_id = %inserted.id, total = %draft.summary.total, "Order recorded");
        Ok(inserted.id)
    }
}
