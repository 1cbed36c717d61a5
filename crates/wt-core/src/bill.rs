//! # Bill Model
//!
//! The draft bill, its line items, and the immutable snapshot taken when
//! payment is confirmed.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   Bill::new(now) ──► draft ──(Cart mutations)──► draft ──┐             │
//! │        ▲                                                 │ confirm     │
//! │        │                                                 ▼             │
//! │   start_new_bill                               FinalizedBill (frozen)  │
//! │        │                                                 │             │
//! │        └─────────────────────────────────────────────────┤             │
//! │                                          to_payload() ───┴──► backend  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Fields are private. Only [`crate::cart::Cart`] mutates a draft, and it
//! recomputes the totals before returning, so readers never observe a
//! quantity with a stale subtotal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;
use crate::money::Money;
use crate::payment::{change_amount, SessionToken};
use crate::totals::{self, BillTotals};
use crate::types::{DiscountPercent, PaymentMethod, Product, TaxRate};
use crate::upi::{QrImage, UpiUri};
use crate::validation::ValidationResult;
use crate::BILL_NUMBER_PREFIX;

// =============================================================================
// Bill Number
// =============================================================================

/// Compact, sortable bill identifier: `WT` + UTC `YYYYMMDD` + 4 digits.
///
/// The trailing digits are the last four digits of the epoch-millisecond
/// timestamp, so two bills created in the same millisecond share a number.
/// The backend treats the number as a reference, not a key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillNumber(String);

impl BillNumber {
    /// Generates the bill number for a creation instant.
    ///
    /// ## Example
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use wt_core::BillNumber;
    ///
    /// let at = Utc.timestamp_millis_opt(1_735_689_601_234).unwrap(); // 2025-01-01
    /// assert_eq!(BillNumber::generate(at).as_str(), "WT202501011234");
    /// ```
    pub fn generate(now: DateTime<Utc>) -> Self {
        let suffix = now.timestamp_millis().rem_euclid(10_000);
        BillNumber(format!(
            "{}{}{:04}",
            BILL_NUMBER_PREFIX,
            now.format("%Y%m%d"),
            suffix
        ))
    }

    /// Parses an existing bill number (e.g. typed by the operator).
    pub fn parse(value: &str) -> ValidationResult<Self> {
        let value = value.trim();
        let digits = value.strip_prefix(BILL_NUMBER_PREFIX).ok_or_else(|| {
            ValidationError::InvalidFormat {
                field: "bill number".to_string(),
                reason: format!("must start with {}", BILL_NUMBER_PREFIX),
            }
        })?;

        if digits.len() != 12 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidFormat {
                field: "bill number".to_string(),
                reason: "must be followed by 12 digits".to_string(),
            });
        }

        Ok(BillNumber(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BillNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Line Item
// =============================================================================

/// One product-quantity pairing within a bill.
///
/// ## Invariant
/// `subtotal == product.price × quantity` after every mutation. The only
/// way to change either side is through methods that recompute it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    product: Product,
    quantity: u32,
    subtotal: Money,
}

impl LineItem {
    pub fn new(product: Product, quantity: u32) -> Self {
        let subtotal = product.price * quantity;
        LineItem {
            product,
            quantity,
            subtotal,
        }
    }

    /// The product snapshot this line was priced from.
    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    /// Unit price of the snapshot.
    pub fn unit_price(&self) -> Money {
        self.product.price
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
        self.subtotal = self.product.price * quantity;
    }

    /// Replaces the product snapshot (price or stock changed upstream).
    pub(crate) fn replace_product(&mut self, product: Product) {
        self.product = product;
        self.subtotal = self.product.price * self.quantity;
    }
}

// =============================================================================
// Bill (draft)
// =============================================================================

/// The in-progress transaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    bill_number: BillNumber,
    items: Vec<LineItem>,
    discount_percent: DiscountPercent,
    tax_rate: TaxRate,
    totals: BillTotals,
    customer_phone: Option<String>,
    payment_method: Option<PaymentMethod>,
    created_at: DateTime<Utc>,
}

impl Bill {
    /// Creates an empty draft with a bill number derived from `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_number(BillNumber::generate(now), now)
    }

    /// Creates an empty draft with an explicit bill number.
    pub fn with_number(bill_number: BillNumber, now: DateTime<Utc>) -> Self {
        Bill {
            bill_number,
            items: Vec::new(),
            discount_percent: DiscountPercent::none(),
            tax_rate: TaxRate::GST,
            totals: BillTotals::default(),
            customer_phone: None,
            payment_method: None,
            created_at: now,
        }
    }

    pub fn bill_number(&self) -> &BillNumber {
        &self.bill_number
    }

    /// Line items in insertion order.
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn discount_percent(&self) -> DiscountPercent {
        self.discount_percent
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Derived totals at full precision.
    pub fn totals(&self) -> BillTotals {
        self.totals
    }

    pub fn customer_phone(&self) -> Option<&str> {
        self.customer_phone.as_deref()
    }

    pub fn payment_method(&self) -> Option<PaymentMethod> {
        self.payment_method
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of quantities across all lines.
    pub fn total_items(&self) -> u32 {
        self.items.iter().map(LineItem::quantity).sum()
    }

    // -------------------------------------------------------------------------
    // Crate-internal mutation (used by Cart)
    // -------------------------------------------------------------------------

    pub(crate) fn items_mut(&mut self) -> &mut Vec<LineItem> {
        &mut self.items
    }

    pub(crate) fn set_discount_percent(&mut self, percent: DiscountPercent) {
        self.discount_percent = percent;
    }

    pub(crate) fn set_customer_phone(&mut self, phone: Option<String>) {
        self.customer_phone = phone;
    }

    pub(crate) fn set_payment_method(&mut self, method: Option<PaymentMethod>) {
        self.payment_method = method;
    }

    /// Re-derives every total from the current lines.
    pub(crate) fn recompute(&mut self) {
        self.totals = totals::compute(&self.items, self.discount_percent, self.tax_rate);
    }
}

// =============================================================================
// Finalized Bill
// =============================================================================

/// Immutable snapshot of a bill whose payment was confirmed.
///
/// Every document generator reads from this type, so the same snapshot
/// always renders to the same bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedBill {
    bill: Bill,
    payment_method: PaymentMethod,
    cash_received: Option<Money>,
    upi_uri: Option<UpiUri>,
    #[serde(skip)]
    qr_image: Option<QrImage>,
    #[serde(skip)]
    session: SessionToken,
    confirmed_at: DateTime<Utc>,
}

impl FinalizedBill {
    pub(crate) fn new(
        bill: Bill,
        payment_method: PaymentMethod,
        cash_received: Option<Money>,
        upi_uri: Option<UpiUri>,
        qr_image: Option<QrImage>,
        session: SessionToken,
        confirmed_at: DateTime<Utc>,
    ) -> Self {
        FinalizedBill {
            bill,
            payment_method,
            cash_received,
            upi_uri,
            qr_image,
            session,
            confirmed_at,
        }
    }

    pub fn bill(&self) -> &Bill {
        &self.bill
    }

    pub fn bill_number(&self) -> &BillNumber {
        self.bill.bill_number()
    }

    pub fn totals(&self) -> BillTotals {
        self.bill.totals()
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    /// Cash tendered (cash bills only).
    pub fn cash_received(&self) -> Option<Money> {
        self.cash_received
    }

    /// Change handed back (cash bills only).
    pub fn change(&self) -> Option<Money> {
        self.cash_received
            .map(|cash| change_amount(cash, self.bill.totals().total))
    }

    pub fn upi_uri(&self) -> Option<&UpiUri> {
        self.upi_uri.as_ref()
    }

    /// QR image, if rendering finished before confirmation.
    pub fn qr_image(&self) -> Option<&QrImage> {
        self.qr_image.as_ref()
    }

    pub fn session(&self) -> SessionToken {
        self.session
    }

    pub fn confirmed_at(&self) -> DateTime<Utc> {
        self.confirmed_at
    }

    /// Builds the persistence payload with every money value rounded to paise.
    pub fn to_payload(&self) -> BillPayload {
        let totals = self.bill.totals().rounded();

        BillPayload {
            bill_number: self.bill.bill_number().clone(),
            items: self
                .bill
                .items()
                .iter()
                .map(|line| BillLinePayload {
                    product_id: line.product().id.clone(),
                    quantity: line.quantity(),
                    subtotal: line.subtotal().round_to_minor(),
                })
                .collect(),
            subtotal: totals.subtotal,
            tax: totals.tax,
            discount: totals.discount,
            total: totals.total,
            payment_method: self.payment_method,
            customer_phone: self.bill.customer_phone().map(str::to_string),
            timestamp: self.bill.created_at(),
        }
    }
}

// =============================================================================
// Wire Payload
// =============================================================================

/// Body of `POST /api/billing/bills`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPayload {
    pub bill_number: BillNumber,
    pub items: Vec<BillLinePayload>,
    pub subtotal: Money,
    pub tax: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLinePayload {
    pub product_id: String,
    pub quantity: u32,
    pub subtotal: Money,
}
