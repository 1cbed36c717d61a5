//! # Console Commands
//!
//! One handler per console verb. Handlers take the [`AppContext`], return
//! `Result<T, CommandError>` and never print; the console loop formats
//! the result.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports, bill view)
//! ├── auth.rs      ◄─── login, logout
//! ├── catalog.rs   ◄─── products, search, lowstock
//! ├── cart.rs      ◄─── add, qty, rm, clear, discount, phone, method, show
//! └── checkout.rs  ◄─── checkout, cash, confirm, retry, cancel, export, new
//! ```
//!
//! ## Lock Discipline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  confirm                                                                │
//! │     │  with_register_mut ─► confirm_payment ─► payload + token          │
//! │     │  (lock released)                                                  │
//! │     ▼                                                                   │
//! │  bills.save_bill(session, payload).await                                │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  with_register_mut ─► mark_saved(token)                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`AppContext`]: crate::context::AppContext

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;

use serde::Serialize;
use wt_core::{BillTotals, Money, PaymentMethod, PaymentState, Register};

/// One bill line as shown to the operator (lines are 1-based).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub line: usize,
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Money,
    pub subtotal: Money,
}

/// Snapshot of the register for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillView {
    pub bill_number: String,
    pub state: PaymentState,
    pub lines: Vec<LineView>,
    pub total_items: u32,
    pub discount_percent: String,
    pub tax_label: String,
    pub totals: BillTotals,
    pub payment_method: Option<PaymentMethod>,
    pub customer_phone: Option<String>,
}

impl From<&Register> for BillView {
    fn from(register: &Register) -> Self {
        let bill = register.cart().bill();
        BillView {
            bill_number: bill.bill_number().to_string(),
            state: register.state(),
            lines: bill
                .items()
                .iter()
                .enumerate()
                .map(|(i, item)| LineView {
                    line: i + 1,
                    product_id: item.product().id.clone(),
                    name: item.product().name.clone(),
                    quantity: item.quantity(),
                    unit_price: item.unit_price(),
                    subtotal: item.subtotal(),
                })
                .collect(),
            total_items: bill.total_items(),
            discount_percent: bill.discount_percent().to_string(),
            tax_label: bill.tax_rate().percent_label(),
            totals: bill.totals(),
            payment_method: bill.payment_method(),
            customer_phone: bill.customer_phone().map(str::to_string),
        }
    }
}

/// Converts a 1-based operator line number into a line index.
pub(crate) fn line_index(line: usize) -> Result<usize, crate::error::CommandError> {
    line.checked_sub(1)
        .ok_or_else(|| crate::error::CommandError::validation("Line numbers start at 1"))
}
