//! # Domain Types
//!
//! Core domain types used throughout WalletTracker POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  ProductInput   │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  _id (backend)  │   │  name, price    │   │  Cash           │       │
//! │  │  name, category │   │  stock, ...     │   │  Upi            │       │
//! │  │  price, stock   │   │  (catalog edit) │   │  Card           │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │    TaxRate      │   │ DiscountPercent │                             │
//! │  │  ─────────────  │   │  ─────────────  │                             │
//! │  │  bps (u32)      │   │  0..=100        │                             │
//! │  │  1800 = 18% GST │   │  (clamped)      │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Products are owned by the inventory backend. The billing engine only
//! reads snapshots of them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation::{self, ValidationResult};

/// Default low-stock threshold used when the backend does not send one.
pub const DEFAULT_MIN_STOCK_ALERT: u32 = 5;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (GST slab applied to every bill)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// The fixed 18% GST rate applied to the discounted subtotal.
    pub const GST: TaxRate = TaxRate(1800);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as an exact fraction (1800 bps → 0.18).
    pub fn as_fraction(&self) -> Decimal {
        Decimal::new(i64::from(self.0), 4)
    }

    /// Whole-percent label for receipts, e.g. `18`.
    pub fn percent_label(&self) -> String {
        Decimal::new(i64::from(self.0), 2).normalize().to_string()
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::GST
    }
}

// =============================================================================
// Discount Percent
// =============================================================================

/// A bill-level discount percentage, always within `0..=100`.
///
/// ## Clamping
/// The operator types the percentage into a free-form field. Anything the
/// field lets through is clamped here, so the totals engine can never see
/// a negative or >100% discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct DiscountPercent(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl DiscountPercent {
    /// Clamps and wraps a percentage.
    pub fn new(percent: Decimal) -> Self {
        DiscountPercent(percent.clamp(Decimal::ZERO, Decimal::ONE_HUNDRED))
    }

    /// Convenience for whole percentages.
    pub fn from_whole(percent: i64) -> Self {
        Self::new(Decimal::from(percent))
    }

    /// No discount.
    pub const fn none() -> Self {
        DiscountPercent(Decimal::ZERO)
    }

    /// Returns the percentage value (e.g. `10` for 10%).
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Returns the fraction (10% → 0.10).
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl Default for DiscountPercent {
    fn default() -> Self {
        DiscountPercent::none()
    }
}

impl fmt::Display for DiscountPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl FromStr for DiscountPercent {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_end_matches('%').trim();
        if trimmed.is_empty() {
            return Ok(DiscountPercent::none());
        }
        Decimal::from_str(trimmed)
            .map(DiscountPercent::new)
            .map_err(|_| ValidationError::InvalidFormat {
                field: "discount".to_string(),
                reason: "must be a number".to_string(),
            })
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product snapshot as served by the inventory backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend identifier.
    #[serde(rename = "_id")]
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    /// Unit selling price.
    pub price: Money,

    /// Units available at the time the snapshot was taken.
    pub stock: u32,

    pub category: String,

    /// Barcode (EAN-13, UPC-A, etc.).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Purchase cost (for margin reports).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Money>,

    /// Stock level at or below which the product is flagged as low.
    #[serde(default = "default_min_stock_alert")]
    pub min_stock_alert: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Owner account on the backend.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_min_stock_alert() -> u32 {
    DEFAULT_MIN_STOCK_ALERT
}

impl Product {
    /// Minimal constructor used by tests and seeding.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Money,
        stock: u32,
        category: impl Into<String>,
    ) -> Self {
        Product {
            id: id.into(),
            name: name.into(),
            price,
            stock,
            category: category.into(),
            barcode: None,
            description: None,
            cost_price: None,
            min_stock_alert: DEFAULT_MIN_STOCK_ALERT,
            image: None,
            user_id: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Checks if at least one unit can be sold.
    #[inline]
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Checks if the product should appear in the low-stock alerts.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock_alert
    }

    /// Checks if `quantity` units fit within the stock snapshot.
    #[inline]
    pub fn can_sell(&self, quantity: u32) -> bool {
        quantity <= self.stock
    }
}

// =============================================================================
// Product Input
// =============================================================================

/// Create/update payload for catalog edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub price: Money,
    pub stock: u32,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Money>,
    #[serde(default = "default_min_stock_alert")]
    pub min_stock_alert: u32,
}

impl ProductInput {
    /// Validates the input before it is sent to the backend.
    pub fn validate(&self) -> ValidationResult<()> {
        validation::validate_product_name(&self.name)?;
        validation::validate_price(self.price)?;
        validation::validate_category(&self.category)?;
        if let Some(cost) = self.cost_price {
            validation::validate_price(cost)?;
        }
        if let Some(barcode) = &self.barcode {
            validation::validate_barcode(barcode)?;
        }
        Ok(())
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        ProductInput {
            name: product.name.clone(),
            price: product.price,
            stock: product.stock,
            category: product.category.clone(),
            barcode: product.barcode.clone(),
            description: product.description.clone(),
            cost_price: product.cost_price,
            min_stock_alert: product.min_stock_alert,
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How the customer pays. The set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash; change is computed from the amount tendered.
    Cash,
    /// UPI deep link / QR scanned by the customer's payment app.
    Upi,
    /// Card payment on an external terminal.
    Card,
}

impl PaymentMethod {
    /// Wire value (`cash`, `upi`, `card`).
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Card => "card",
        }
    }

    /// Label printed on receipts.
    pub fn display_text(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash Payment",
            PaymentMethod::Upi => "UPI Payment",
            PaymentMethod::Card => "Card Payment",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(PaymentMethod::Cash),
            "upi" => Ok(PaymentMethod::Upi),
            "card" => Ok(PaymentMethod::Card),
            _ => Err(ValidationError::NotAllowed {
                field: "payment method".to_string(),
                allowed: vec!["cash".to_string(), "upi".to_string(), "card".to_string()],
            }),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
