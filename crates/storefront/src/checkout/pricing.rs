//! Shipping and tax presentation policy.

use rust_decimal::Decimal;
use serde::Serialize;

use storefront_core::Price;

/// How shipping and tax are derived from a cart subtotal.
///
/// An empty cart never pays shipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Subtotal at which shipping becomes free.
    pub free_shipping_threshold: Price,
    /// Whether a subtotal exactly at the threshold already ships free.
    pub free_at_threshold: bool,
    /// Shipping charged below the threshold.
    pub flat_shipping: Price,
    /// Tax rate applied to the subtotal, e.g. `0.08`.
    pub tax_rate: Decimal,
}

impl PricingPolicy {
    /// Cart page estimate: free shipping from $50, otherwise $4.99; 8% tax.
    #[must_use]
    pub fn cart_preview() -> Self {
        Self {
            free_shipping_threshold: Price::from_cents(5000),
            free_at_threshold: true,
            flat_shipping: Price::from_cents(499),
            tax_rate: Decimal::new(8, 2),
        }
    }

    /// Checkout: free shipping above $100, otherwise $10; 7% tax.
    #[must_use]
    pub fn checkout() -> Self {
        Self {
            free_shipping_threshold: Price::from_cents(10000),
            free_at_threshold: false,
            flat_shipping: Price::from_cents(1000),
            tax_rate: Decimal::new(7, 2),
        }
    }

    /// Shipping charged for `subtotal`.
    #[must_use]
    pub fn shipping(&self, subtotal: Price) -> Price {
        let free = subtotal.is_zero()
            || subtotal > self.free_shipping_threshold
            || (self.free_at_threshold && subtotal == self.free_shipping_threshold);
        if free { Price::ZERO } else { self.flat_shipping }
    }

    /// Tax on `subtotal`, rounded half away from zero to cents.
    #[must_use]
    pub fn tax(&self, subtotal: Price) -> Price {
        subtotal.scale(self.tax_rate).round_to_cents()
    }

    /// Full breakdown for `subtotal`.
    #[must_use]
    pub fn summarize(&self, subtotal: Price) -> OrderSummary {
        let shipping = self.shipping(subtotal);
        let tax = self.tax(subtotal);
        OrderSummary {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// Subtotal, shipping, tax and grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}
