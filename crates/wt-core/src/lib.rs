//! # wt-core: Pure Billing Logic for WalletTracker POS
//!
//! This crate is the **heart** of WalletTracker POS. It holds the bill model,
//! the totals engine, the checkout state machine and every document the
//! terminal produces, as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     WalletTracker POS Architecture                      │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Operator console (apps/terminal)                │   │
//! │  │    search ──► add/qty/rm ──► checkout ──► confirm ──► export    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  ★ wt-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐   │   │
//! │  │   │   cart   │  │  totals  │  │ register │  │  documents   │   │   │
//! │  │   │   bill   │  │  money   │  │ payment  │  │  upi         │   │   │
//! │  │   └──────────┘  └──────────┘  └──────────┘  └──────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO LOGGING • PURE FUNCTIONS            │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  wt-api (collaborators)                         │   │
//! │  │     inventory / billing backend, QR renderer, export files      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Exact decimal money, rounded only on the way out
//! - [`types`] - Product, payment method, tax rate, discount percent
//! - [`catalog`] - Product search and stock filters
//! - [`bill`] - Bill draft, line items, finalized snapshot, wire payload
//! - [`totals`] - Subtotal / discount / tax / total derivation
//! - [`cart`] - Mutations over the draft bill
//! - [`payment`] - Payment validity, change, session artifacts
//! - [`register`] - Checkout state machine
//! - [`upi`] - UPI deep-link encoder
//! - [`documents`] - Receipt, notes, structured record, print layout
//! - [`validation`] - Business rule validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use chrono::Utc;
//! use wt_core::{Cart, DiscountPercent, Money, Product};
//!
//! let rice = Product::new("p1", "Rice", Money::from_major(100), 5, "Grocery");
//!
//! let mut cart = Cart::new(Utc::now());
//! cart.add_item(&rice);
//! cart.add_item(&rice);
//! cart.set_discount_percent(DiscountPercent::from_whole(10));
//!
//! let totals = cart.bill().totals();
//! assert_eq!(totals.subtotal.to_fixed(), "200.00");
//! assert_eq!(totals.tax.to_fixed(), "32.40");
//! assert_eq!(totals.total.to_fixed(), "212.40");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod bill;
pub mod cart;
pub mod catalog;
pub mod documents;
pub mod error;
pub mod money;
pub mod payment;
pub mod register;
pub mod totals;
pub mod types;
pub mod upi;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use wt_core::Money`
// instead of `use wt_core::money::Money`

pub use bill::{Bill, BillNumber, BillPayload, FinalizedBill, LineItem};
pub use cart::{Cart, CartChange, IgnoreReason};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use payment::{PaymentSession, PaymentState, QrStatus, SessionToken};
pub use register::Register;
pub use totals::BillTotals;
pub use types::*;
pub use upi::{QrImage, QrOutcome, UpiPayee, UpiUri};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Prefix of every bill number (`WT20250101` + 4 digits).
pub const BILL_NUMBER_PREFIX: &str = "WT";

/// Number of products shown in the quick-pick grid when the search box is blank.
pub const QUICK_PICK_LIMIT: usize = 6;
