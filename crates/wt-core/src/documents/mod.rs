//! # Document Generators
//!
//! Renders a bill into the representations the terminal hands out.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  FinalizedBill ──┬──► receipt::render   plain-text receipt (.txt)       │
//! │                  ├──► print::layout     A4 page model (.layout.json)    │
//! │                  │                                                      │
//! │  Bill ───────────┼──► note::compact     single-line UPI note            │
//! │                  ├──► note::detailed    multi-line console note         │
//! │                  └──► record::build     {products, total_amount} (.json)│
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every generator is a pure function of its input: rendering the same
//! snapshot twice yields identical output. Writing files or printing is
//! left to the caller.

pub mod note;
pub mod print;
pub mod receipt;
pub mod record;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::bill::{Bill, FinalizedBill, LineItem};
use crate::types::PaymentMethod;

/// Store name printed when none is configured.
pub const DEFAULT_STORE_NAME: &str = "WALLETTRACKER";

/// Footer printed when none is configured.
pub const DEFAULT_FOOTER: &str = "Thank you for shopping with us!";

/// India Standard Time, in minutes east of UTC.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

/// Store details printed on every document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProfile {
    pub name: String,
    pub footer: String,
    /// Offset used to print local timestamps.
    pub utc_offset_minutes: i32,
}

impl Default for StoreProfile {
    fn default() -> Self {
        StoreProfile {
            name: DEFAULT_STORE_NAME.to_string(),
            footer: DEFAULT_FOOTER.to_string(),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}

impl StoreProfile {
    /// Document title, e.g. `WALLETTRACKER BILL`.
    pub fn title(&self) -> String {
        format!("{} BILL", self.name)
    }

    fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// `dd/mm/yyyy, hh:mm:ss` in store-local time.
    pub fn format_timestamp(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset())
            .format("%d/%m/%Y, %H:%M:%S")
            .to_string()
    }

    /// `dd/mm/yyyy` in store-local time.
    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset()).format("%d/%m/%Y").to_string()
    }
}

// =============================================================================
// Shared line builders (receipt and print layout)
// =============================================================================

/// `Bill #`, `Date` and optional `Customer Phone` lines.
pub(crate) fn header_lines(bill: &Bill, store: &StoreProfile) -> Vec<String> {
    let mut lines = vec![
        format!("Bill #: {}", bill.bill_number()),
        format!("Date: {}", store.format_timestamp(bill.created_at())),
    ];
    if let Some(phone) = bill.customer_phone() {
        lines.push(format!("Customer Phone: {}", phone));
    }
    lines
}

/// Three lines per item: name with category, quantity × price, subtotal.
pub(crate) fn item_lines(line: &LineItem) -> [String; 3] {
    [
        format!("{} ({})", line.product().name, line.product().category),
        format!("Qty: {} x {}", line.quantity(), line.unit_price()),
        format!("Subtotal: {}", line.subtotal()),
    ]
}

/// Subtotal, discount (only when non-zero) and tax lines.
pub(crate) fn summary_lines(bill: &Bill) -> Vec<String> {
    let totals = bill.totals();
    let mut lines = vec![format!("Subtotal: {}", totals.subtotal)];
    if totals.discount.is_positive() {
        lines.push(format!(
            "Discount ({}%): {}",
            bill.discount_percent(),
            totals.discount
        ));
    }
    lines.push(format!(
        "Tax ({}% GST): {}",
        bill.tax_rate().percent_label(),
        totals.tax
    ));
    lines
}

pub(crate) fn total_line(bill: &Bill) -> String {
    format!("Total: {}", bill.totals().total)
}

/// Payment method and, for cash, the amount received and change given.
pub(crate) fn payment_lines(finalized: &FinalizedBill) -> Vec<String> {
    let mut lines = vec![format!(
        "Payment Method: {}",
        finalized.payment_method().display_text()
    )];

    if finalized.payment_method() == PaymentMethod::Cash {
        if let (Some(cash), Some(change)) = (finalized.cash_received(), finalized.change()) {
            if cash.is_positive() {
                lines.push(format!("Cash Received: {}", cash));
                lines.push(format!("Change Given: {}", change));
            }
        }
    }

    lines
}
