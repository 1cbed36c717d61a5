//! Structured bill record for programmatic export.
//!
//! The record is a deliberately small projection: one `{name, price}` entry
//! per line and the rounded total. Quantities, tax and discount are not
//! part of it; consumers that need them use the persistence payload.

use serde::{Deserialize, Serialize};

use crate::bill::Bill;
use crate::money::Money;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordProduct {
    pub name: String,
    /// Unit price, not the line subtotal.
    pub price: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillRecord {
    pub products: Vec<RecordProduct>,
    pub total_amount: Money,
}

/// Projects a bill into its export record.
pub fn build(bill: &Bill) -> BillRecord {
    BillRecord {
        products: bill
            .items()
            .iter()
            .map(|line| RecordProduct {
                name: line.product().name.clone(),
                price: line.unit_price(),
            })
            .collect(),
        total_amount: bill.totals().total.round_to_minor(),
    }
}

/// Pretty-printed JSON (two-space indent).
pub fn to_json(record: &BillRecord) -> serde_json::Result<String> {
    serde_json::to_string_pretty(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::types::{DiscountPercent, Product};
    use chrono::Utc;

    #[test]
    fn test_record_projection() {
        let mut cart = Cart::new(Utc::now());
        let rice = Product::new("p1", "Rice", Money::from_major(100), 5, "Grocery");
        cart.add_item(&rice);
        cart.add_item(&rice);
        cart.set_discount_percent(DiscountPercent::from_whole(10));

        let record = build(cart.bill());
        assert_eq!(record.products.len(), 1);
        assert_eq!(record.products[0].price, Money::from_major(100));
        assert_eq!(record.total_amount.to_fixed(), "212.40");

        let json = to_json(&record).unwrap();
        assert_eq!(
            json,
            "{\n  \"products\": [\n    {\n      \"name\": \"Rice\",\n      \"price\": 100.0\n    }\n  ],\n  \"total_amount\": 212.4\n}"
        );
    }
}
