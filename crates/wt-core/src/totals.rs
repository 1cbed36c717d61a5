//! # Totals Engine
//!
//! Derives the money fields of a bill from its line items.
//!
//! ## Pipeline
//! ```text
//!   Σ line.subtotal ──► subtotal
//!                          │
//!                          ├── × discount% / 100 ──► discount
//!                          ▼
//!                  subtotal - discount ──► taxable
//!                                             │
//!                                             ├── × 18% ──► tax
//!                                             ▼
//!                                  taxable + tax ──► total
//! ```
//!
//! The whole pipeline runs again after every mutation. Nothing is maintained
//! incrementally and nothing is rounded here.

use serde::Serialize;

use crate::bill::LineItem;
use crate::money::Money;
use crate::types::{DiscountPercent, TaxRate};

/// Derived money fields of a bill, held at full precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct BillTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub tax: Money,
    pub total: Money,
}

impl BillTotals {
    /// Taxable amount: subtotal after discount.
    pub fn taxable(&self) -> Money {
        self.subtotal - self.discount
    }

    /// Each field rounded to paise on its own.
    ///
    /// Fields are rounded independently, so `total` may differ from
    /// `subtotal - discount + tax` of the rounded values by one paisa.
    pub fn rounded(&self) -> BillTotals {
        BillTotals {
            subtotal: self.subtotal.round_to_minor(),
            discount: self.discount.round_to_minor(),
            tax: self.tax.round_to_minor(),
            total: self.total.round_to_minor(),
        }
    }
}

/// Computes the totals for a set of line items.
///
/// ## Example
/// ```rust
/// use wt_core::totals::compute;
/// use wt_core::{DiscountPercent, TaxRate};
///
/// let totals = compute(&[], DiscountPercent::from_whole(10), TaxRate::GST);
/// assert!(totals.total.is_zero());
/// ```
pub fn compute(items: &[LineItem], discount_percent: DiscountPercent, tax_rate: TaxRate) -> BillTotals {
    let subtotal: Money = items.iter().map(LineItem::subtotal).sum();
    let discount = subtotal.percentage(discount_percent);
    let taxable = subtotal - discount;
    let tax = taxable.calculate_tax(tax_rate);

    BillTotals {
        subtotal,
        discount,
        tax,
        total: taxable + tax,
    }
}
