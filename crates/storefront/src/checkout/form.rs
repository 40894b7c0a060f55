//! Checkout form fields and validation.

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use storefront_core::PaymentMethod;

/// Country preselected in the form.
pub const DEFAULT_COUNTRY: &str = "United States";

/// Where the order ships. Serialized with the backend's camelCase keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self {
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            postal_code: String::new(),
            country: DEFAULT_COUNTRY.to_string(),
        }
    }
}

/// Card fields as typed. Number and CVC never leave the form.
pub struct CardDetails {
    pub name: String,
    pub number: SecretString,
    pub expiry: String,
    pub cvc: SecretString,
}

impl std::fmt::Debug for CardDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CardDetails")
            .field("name", &self.name)
            .field("number", &"[REDACTED]")
            .field("expiry", &self.expiry)
            .field("cvc", &"[REDACTED]")
            .finish()
    }
}

impl CardDetails {
    /// Last four digits of the card number, ignoring spaces and dashes.
    #[must_use]
    pub fn last_four(&self) -> String {
        let digits: Vec<char> = self
            .number
            .expose_secret()
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        let start = digits.len().saturating_sub(4);
        digits.get(start..).unwrap_or_default().iter().collect()
    }
}

/// What gets stored about the payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub method: PaymentMethod,
    pub card_name: Option<String>,
    pub last_four: Option<String>,
}

/// The submitted checkout form.
#[derive(Debug)]
pub struct CheckoutForm {
    pub shipping: ShippingAddress,
    pub payment_method: PaymentMethod,
    /// Required for [`PaymentMethod::CreditCard`], ignored otherwise.
    pub card: Option<CardDetails>,
}

impl CheckoutForm {
    /// Check required fields and reduce payment data to what may be stored.
    ///
    /// Phone and country are optional. Card fields are required only when
    /// paying by credit card.
    ///
    /// # Errors
    ///
    /// Returns the labels of every missing field, in form order.
    pub fn validate(&self) -> Result<PaymentDetails, Vec<&'static str>> {
        let s = &self.shipping;
        let mut missing: Vec<&'static str> = [
            ("first name", &s.first_name),
            ("last name", &s.last_name),
            ("email", &s.email),
            ("address", &s.address),
            ("city", &s.city),
            ("state", &s.state),
            ("postal code", &s.postal_code),
        ]
        .into_iter()
        .filter(|(_, value)| is_blank(value))
        .map(|(label, _)| label)
        .collect();

        if self.payment_method == PaymentMethod::CreditCard {
            match &self.card {
                Some(card) => missing.extend(
                    [
                        ("card name", is_blank(&card.name)),
                        ("card number", is_blank(card.number.expose_secret())),
                        ("card expiry", is_blank(&card.expiry)),
                        ("card CVC", is_blank(card.cvc.expose_secret())),
                    ]
                    .into_iter()
                    .filter(|(_, blank)| *blank)
                    .map(|(label, _)| label),
                ),
                None => missing.extend(["card name", "card number", "card expiry", "card CVC"]),
            }
        }

        if !missing.is_empty() {
            return Err(missing);
        }

        Ok(match (&self.payment_method, &self.card) {
            (PaymentMethod::CreditCard, Some(card)) => PaymentDetails {
                method: PaymentMethod::CreditCard,
                card_name: Some(card.name.trim().to_string()),
                last_four: Some(card.last_four()),
            },
            (method, _) => PaymentDetails {
                method: *method,
                card_name: None,
                last_four: None,
            },
        })
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
