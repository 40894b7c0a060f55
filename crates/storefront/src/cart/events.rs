//! User-visible notifications raised by store operations.

use std::fmt;

use storefront_core::{OrderId, ProductId};

/// Something the shopper should be told about.
///
/// Events are queued by the store and handed out by
/// [`CartStore::drain_events`](super::CartStore::drain_events).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartEvent {
    AddedToCart {
        product_id: ProductId,
        name: String,
        quantity: u32,
    },
    RemovedFromCart {
        product_id: ProductId,
    },
    SavedForLater {
        product_id: ProductId,
    },
    MovedToCart {
        product_id: ProductId,
    },
    CartCleared,
    AddedToWishlist {
        product_id: ProductId,
        name: String,
    },
    RemovedFromWishlist {
        product_id: ProductId,
    },
    OrderPlaced {
        order_id: OrderId,
    },
}

impl CartEvent {
    /// Headline, e.g. `"Premium Yoga Mat added to cart"`.
    #[must_use]
    pub fn title(&self) -> String {
        match self {
            Self::AddedToCart { name, .. } => format!("{name} added to cart"),
            Self::RemovedFromCart { .. } => "Item removed from cart".to_string(),
            Self::SavedForLater { .. } => "Item saved for later".to_string(),
            Self::MovedToCart { .. } => "Item moved to cart".to_string(),
            Self::CartCleared => "Cart cleared".to_string(),
            Self::AddedToWishlist { name, .. } => format!("{name} added to wishlist"),
            Self::RemovedFromWishlist { .. } => "Item removed from wishlist".to_string(),
            Self::OrderPlaced { .. } => "Order placed successfully!".to_string(),
        }
    }

    /// Secondary line, if the event has one.
    #[must_use]
    pub fn description(&self) -> Option<String> {
        match self {
            Self::AddedToCart { quantity: 1, .. } => Some("1 item added".to_string()),
            Self::AddedToCart { quantity, .. } => Some(format!("{quantity} items added")),
            Self::OrderPlaced { order_id } => Some(format!("Order {order_id}")),
            _ => None,
        }
    }
}

impl fmt::Display for CartEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title())?;
        if let Some(description) = self.description() {
            write!(f, " ({description})")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(quantity: u32) -> CartEvent {
        CartEvent::AddedToCart {
            product_id: ProductId::new("7"),
            name: "Premium Yoga Mat".to_string(),
            quantity,
        }
    }

    #[test]
    fn test_added_to_cart_pluralizes() {
        assert_eq!(added(1).description().as_deref(), Some("1 item added"));
        assert_eq!(added(3).description().as_deref(), Some("3 items added"));
    }

    #[test]
    fn test_display_joins_title_and_description() {
        assert_eq!(
            added(2).to_string(),
            "Premium Yoga Mat added to cart (2 items added)"
        );
        assert_eq!(CartEvent::CartCleared.to_string(), "Cart cleared");
    }
}
