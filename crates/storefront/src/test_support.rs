//! Product builders shared by unit tests.

use storefront_core::{Price, Product, ProductId};

/// A product with the given ID, price in cents and category.
pub fn product(id: &str, cents: u32, category: &str) -> Product {
    Product {
        id: ProductId::new(id),
        name: format!("Product {id}"),
        description: format!("Description of {id}"),
        price: Price::from_cents(cents),
        image: "/placeholder.svg".to_string(),
        category: category.to_string(),
        rating: 4.0,
        in_stock: true,
        fast_delivery: None,
    }
}

/// A $10 product with the given rating.
pub fn rated(id: &str, rating: f64) -> Product {
    Product {
        rating,
        ..product(id, 1000, "Misc")
    }
}
