//! # Cart Commands
//!
//! Edits to the draft bill. Every edit goes through the register, which
//! refuses them while a payment is awaiting confirmation or after the bill
//! was confirmed.
//!
//! ## Bill Lifecycle
//! ```text
//! ┌──────────┐  add/qty/rm   ┌──────────┐  checkout   ┌──────────┐  confirm  ┌──────────┐
//! │  Empty   │──────────────►│ Editing  │────────────►│ Awaiting │──────────►│ Confirmed│
//! └──────────┘               └──────────┘◄────────────└──────────┘           └──────────┘
//!                                              cancel
//! ```

use std::str::FromStr;

use serde::Serialize;
use tracing::{debug, info};
use wt_core::{CartChange, DiscountPercent, PaymentMethod};

use super::{line_index, BillView};
use crate::commands::catalog;
use crate::context::AppContext;
use crate::error::CommandError;

/// What an edit did, plus the bill afterwards.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub change: CartChange,
    pub bill: BillView,
}

/// Current bill.
pub fn show(ctx: &AppContext) -> BillView {
    ctx.register.with_register(|register| BillView::from(register))
}

/// Adds one unit of a product picked by `#n`, id or barcode.
pub fn add_item(ctx: &AppContext, reference: &str) -> Result<CartResponse, CommandError> {
    debug!(reference = %reference, "add_item command");
    let product = catalog::resolve(ctx, reference)?;

    ctx.register.with_register_mut(|register| -> Result<CartResponse, CommandError> {
        let change = register.cart_mut()?.add_item(&product);
        Ok(CartResponse {
            change,
            bill: BillView::from(&*register),
        })
    })
}

/// Sets the quantity of a 1-based line. Zero or less removes it.
pub fn update_quantity(
    ctx: &AppContext,
    line: usize,
    quantity: i64,
) -> Result<CartResponse, CommandError> {
    debug!(line, quantity, "update_quantity command");
    let index = line_index(line)?;

    ctx.register.with_register_mut(|register| -> Result<CartResponse, CommandError> {
        let change = register.cart_mut()?.update_quantity(index, quantity)?;
        Ok(CartResponse {
            change,
            bill: BillView::from(&*register),
        })
    })
}

pub fn remove_item(ctx: &AppContext, line: usize) -> Result<CartResponse, CommandError> {
    debug!(line, "remove_item command");
    let index = line_index(line)?;

    ctx.register.with_register_mut(|register| -> Result<CartResponse, CommandError> {
        let change = register.cart_mut()?.remove_item(index)?;
        Ok(CartResponse {
            change,
            bill: BillView::from(&*register),
        })
    })
}

/// Empties the bill and resets discount, phone and payment method.
pub fn clear(ctx: &AppContext) -> Result<CartResponse, CommandError> {
    ctx.register.with_register_mut(|register| -> Result<CartResponse, CommandError> {
        let change = register.cart_mut()?.clear();
        info!(bill_number = %register.cart().bill().bill_number(), "Bill cleared");
        Ok(CartResponse {
            change,
            bill: BillView::from(&*register),
        })
    })
}

/// Sets the bill discount, e.g. `10` or `12.5%`.
pub fn set_discount(ctx: &AppContext, input: &str) -> Result<BillView, CommandError> {
    let percent = DiscountPercent::from_str(input)?;

    ctx.register.with_register_mut(|register| -> Result<BillView, CommandError> {
        register.cart_mut()?.set_discount_percent(percent);
        Ok(BillView::from(&*register))
    })
}

/// Sets the customer phone. No input clears it.
pub fn set_phone(ctx: &AppContext, phone: Option<&str>) -> Result<BillView, CommandError> {
    ctx.register.with_register_mut(|register| -> Result<BillView, CommandError> {
        register.cart_mut()?.set_customer_phone(phone)?;
        Ok(BillView::from(&*register))
    })
}

/// Picks `cash`, `upi` or `card`. `none` clears the choice.
pub fn set_method(ctx: &AppContext, input: &str) -> Result<BillView, CommandError> {
    let method = match input.trim() {
        "" | "none" => None,
        other => Some(PaymentMethod::from_str(other)?),
    };

    ctx.register.with_register_mut(|register| -> Result<BillView, CommandError> {
        register.cart_mut()?.set_payment_method(method);
        Ok(BillView::from(&*register))
    })
}
