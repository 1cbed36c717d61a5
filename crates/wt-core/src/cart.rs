//! # Cart Model
//!
//! All mutations of the draft bill go through [`Cart`].
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator action          Cart method              Result               │
//! │  ───────────────          ───────────              ──────               │
//! │                                                                         │
//! │  Pick product ──────────► add_item() ────────────► Added / Incremented  │
//! │                                                     Ignored(stock)      │
//! │                                                                         │
//! │  Change quantity ───────► update_quantity() ─────► Updated / Removed    │
//! │                                                     Ignored(stock)      │
//! │                                                                         │
//! │  Remove line ───────────► remove_item() ─────────► Removed              │
//! │                                                                         │
//! │  Clear bill ────────────► clear() ───────────────► Cleared              │
//! │                                                                         │
//! │  NOTE: every method recomputes totals before it returns.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock limits
//! Requests that would push a quantity past the product's stock snapshot
//! leave the bill untouched. They are not errors; the returned
//! [`CartChange::Ignored`] tells the caller why nothing happened.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::bill::{Bill, LineItem};
use crate::error::{CoreError, CoreResult};
use crate::types::{DiscountPercent, PaymentMethod, Product};
use crate::validation::validate_customer_phone;

/// What a cart mutation did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CartChange {
    /// New line appended at `index` with quantity 1.
    Added { index: usize },
    /// Existing line's quantity went up by one.
    Incremented { index: usize, quantity: u32 },
    /// Line quantity set explicitly.
    Updated { index: usize, quantity: u32 },
    /// Newer product data lowered the line's quantity to its stock.
    Clamped { index: usize, quantity: u32 },
    /// Line deleted.
    Removed { index: usize, product_name: String },
    /// All lines and bill options reset.
    Cleared,
    /// Request left the bill unchanged.
    Ignored(IgnoreReason),
}

/// Why a mutation was a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IgnoreReason {
    /// Product has no stock at all.
    OutOfStock,
    /// Requested quantity exceeds the stock snapshot.
    StockLimit { stock: u32 },
}

/// Outcome of reloading product snapshots into the bill.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    /// Lines whose product data was replaced.
    pub updated: usize,
    /// Names of lines whose quantity was lowered to the new stock.
    pub clamped: Vec<String>,
    /// Names of lines dropped (product gone or out of stock).
    pub removed: Vec<String>,
}

/// Owns the draft bill for one transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    bill: Bill,
}

impl Cart {
    /// Starts an empty draft with a bill number derived from `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Cart {
            bill: Bill::new(now),
        }
    }

    /// Wraps an existing draft.
    pub fn from_bill(mut bill: Bill) -> Self {
        bill.recompute();
        Cart { bill }
    }

    /// Read-only view of the draft.
    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    pub(crate) fn into_bill(self) -> Bill {
        self.bill
    }

    pub fn is_empty(&self) -> bool {
        self.bill.is_empty()
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u32 {
        self.bill.total_items()
    }

    /// Adds one unit of a product.
    ///
    /// ## Behavior
    /// - Stock 0: ignored
    /// - Already on the bill: +1 if the new quantity fits the stock, else ignored
    /// - Not on the bill: appended with quantity 1
    ///
    /// An existing line takes `product` as its new snapshot unless the add is
    /// ignored. If the newer stock is below the line's quantity, the quantity
    /// is lowered to it and [`CartChange::Clamped`] is returned.
    pub fn add_item(&mut self, product: &Product) -> CartChange {
        if !product.is_in_stock() {
            return CartChange::Ignored(IgnoreReason::OutOfStock);
        }

        let position = self
            .bill
            .items()
            .iter()
            .position(|line| line.product().id == product.id);

        let change = match position {
            Some(index) => {
                let line = &mut self.bill.items_mut()[index];
                let current = line.quantity();
                match current.checked_add(1).filter(|q| product.can_sell(*q)) {
                    Some(quantity) => {
                        line.replace_product(product.clone());
                        line.set_quantity(quantity);
                        CartChange::Incremented { index, quantity }
                    }
                    None if current > product.stock => {
                        line.replace_product(product.clone());
                        line.set_quantity(product.stock);
                        CartChange::Clamped {
                            index,
                            quantity: product.stock,
                        }
                    }
                    None => CartChange::Ignored(IgnoreReason::StockLimit {
                        stock: product.stock,
                    }),
                }
            }
            None => {
                self.bill.items_mut().push(LineItem::new(product.clone(), 1));
                CartChange::Added {
                    index: self.bill.items().len() - 1,
                }
            }
        };

        self.bill.recompute();
        change
    }

    /// Sets the quantity of the line at `index`.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: same as [`Cart::remove_item`]
    /// - `quantity > stock`: ignored, previous quantity kept
    ///
    /// ## Errors
    /// [`CoreError::LineIndexOutOfRange`] if `index` addresses no line.
    pub fn update_quantity(&mut self, index: usize, quantity: i64) -> CoreResult<CartChange> {
        if quantity <= 0 {
            return self.remove_item(index);
        }

        let len = self.bill.items().len();
        let line = self
            .bill
            .items_mut()
            .get_mut(index)
            .ok_or(CoreError::LineIndexOutOfRange { index, len })?;

        let stock = line.product().stock;
        let quantity = match u32::try_from(quantity) {
            Ok(q) if q <= stock => q,
            _ => return Ok(CartChange::Ignored(IgnoreReason::StockLimit { stock })),
        };

        line.set_quantity(quantity);
        self.bill.recompute();
        Ok(CartChange::Updated { index, quantity })
    }

    /// Deletes the line at `index`.
    pub fn remove_item(&mut self, index: usize) -> CoreResult<CartChange> {
        let len = self.bill.items().len();
        if index >= len {
            return Err(CoreError::LineIndexOutOfRange { index, len });
        }

        let line = self.bill.items_mut().remove(index);
        self.bill.recompute();
        Ok(CartChange::Removed {
            index,
            product_name: line.product().name.clone(),
        })
    }

    /// Empties the bill and resets payment method, phone and discount.
    pub fn clear(&mut self) -> CartChange {
        self.bill.items_mut().clear();
        self.bill.set_payment_method(None);
        self.bill.set_customer_phone(None);
        self.bill.set_discount_percent(DiscountPercent::none());
        self.bill.recompute();
        CartChange::Cleared
    }

    /// Sets the bill-level discount. The percentage is already clamped by its type.
    pub fn set_discount_percent(&mut self, percent: DiscountPercent) {
        self.bill.set_discount_percent(percent);
        self.bill.recompute();
    }

    pub fn set_payment_method(&mut self, method: Option<PaymentMethod>) {
        self.bill.set_payment_method(method);
    }

    /// Sets or clears the customer phone. Blank input clears it.
    pub fn set_customer_phone(&mut self, phone: Option<&str>) -> CoreResult<()> {
        let phone = match phone.map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => Some(validate_customer_phone(raw)?),
            None => None,
        };
        self.bill.set_customer_phone(phone);
        Ok(())
    }

    /// Replaces line snapshots with freshly loaded product data.
    ///
    /// ## Behavior
    /// - Product missing from `products` or now out of stock: line removed
    /// - Quantity above the new stock: lowered to the stock
    /// - Otherwise: snapshot replaced, quantity kept
    pub fn refresh_products(&mut self, products: &[Product]) -> RefreshReport {
        let mut report = RefreshReport::default();

        self.bill.items_mut().retain_mut(|line| {
            let fresh = products.iter().find(|p| p.id == line.product().id);
            match fresh {
                Some(product) if product.is_in_stock() => {
                    if line.quantity() > product.stock {
                        report.clamped.push(product.name.clone());
                        line.replace_product(product.clone());
                        line.set_quantity(product.stock);
                    } else {
                        line.replace_product(product.clone());
                    }
                    report.updated += 1;
                    true
                }
                _ => {
                    report.removed.push(line.product().name.clone());
                    false
                }
            }
        });

        self.bill.recompute();
        report
    }
}
