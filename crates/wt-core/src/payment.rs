//! # Payment Resolver
//!
//! Payment validity, change computation, and the ephemeral artifacts that
//! live between "checkout initiated" and "payment confirmed or cancelled".
//!
//! ## State Machine
//! ```text
//!                    begin_checkout
//!  NoMethodSelected ───────────────► AwaitingConfirmation ───confirm──► Confirmed
//!         ▲                              │        ▲                        │
//!         │                        cancel│        │begin_checkout          │
//!         │                              ▼        │                        │
//!         │                           Cancelled ──┘                        │
//!         └────────────────────────── start_new_bill ◄────────────────────┘
//! ```
//!
//! The transitions themselves live in [`crate::register::Register`]; this
//! module holds the pure predicates and the session value types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::money::Money;
use crate::types::PaymentMethod;
use crate::upi::{QrImage, UpiUri};

/// Checkout state of the register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentState {
    /// Bill is being edited; no checkout has started.
    NoMethodSelected,
    /// Checkout started; cart locked until confirm or cancel.
    AwaitingConfirmation,
    /// Payment confirmed; bill frozen.
    Confirmed,
    /// Checkout closed without payment; bill editable again.
    Cancelled,
}

impl PaymentState {
    /// Whether the draft bill may be edited in this state.
    pub fn allows_editing(&self) -> bool {
        matches!(self, PaymentState::NoMethodSelected | PaymentState::Cancelled)
    }
}

/// Validity predicate for confirming a payment.
///
/// Cash needs at least the total in hand. UPI and card settle outside the
/// terminal and are always accepted.
///
/// ## Example
/// ```rust
/// use wt_core::payment::is_payment_valid;
/// use wt_core::{Money, PaymentMethod};
///
/// let total = Money::from_minor(21_240);
/// assert!(is_payment_valid(PaymentMethod::Cash, Some(Money::from_major(250)), total));
/// assert!(!is_payment_valid(PaymentMethod::Cash, Some(Money::from_major(200)), total));
/// assert!(is_payment_valid(PaymentMethod::Upi, None, total));
/// ```
pub fn is_payment_valid(method: PaymentMethod, cash_received: Option<Money>, total: Money) -> bool {
    match method {
        PaymentMethod::Cash => cash_received.map_or(false, |cash| cash >= total),
        PaymentMethod::Upi | PaymentMethod::Card => true,
    }
}

/// Change owed to the customer: `max(0, cash - total)`.
pub fn change_amount(cash_received: Money, total: Money) -> Money {
    cash_received.saturating_sub(total)
}

// =============================================================================
// Session
// =============================================================================

/// Identifies one checkout attempt.
///
/// Asynchronous completions (QR rendering, bill save) carry the token they
/// were started with. A completion whose token no longer matches the live
/// session is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionToken(u64);

impl SessionToken {
    pub const fn new(value: u64) -> Self {
        SessionToken(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Progress of the QR image for a UPI checkout.
#[derive(Debug, Clone, PartialEq)]
pub enum QrStatus {
    /// Rendering requested, no answer yet. The amount can already be shown.
    Pending,
    Ready(QrImage),
    /// Rendering failed; the operator can retry or read out the link.
    Failed(String),
}

impl QrStatus {
    pub fn image(&self) -> Option<&QrImage> {
        match self {
            QrStatus::Ready(image) => Some(image),
            _ => None,
        }
    }
}

/// UPI request attached to a checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct UpiCheckout {
    pub uri: UpiUri,
    pub qr: QrStatus,
}

/// Ephemeral state of one checkout attempt. Never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentSession {
    token: SessionToken,
    method: PaymentMethod,
    cash_received: Option<Money>,
    upi: Option<UpiCheckout>,
}

impl PaymentSession {
    pub(crate) fn new(token: SessionToken, method: PaymentMethod, upi: Option<UpiCheckout>) -> Self {
        PaymentSession {
            token,
            method,
            cash_received: None,
            upi,
        }
    }

    pub fn token(&self) -> SessionToken {
        self.token
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }

    pub fn cash_received(&self) -> Option<Money> {
        self.cash_received
    }

    pub fn upi(&self) -> Option<&UpiCheckout> {
        self.upi.as_ref()
    }

    pub(crate) fn set_cash_received(&mut self, amount: Money) {
        self.cash_received = Some(amount);
    }

    pub(crate) fn upi_mut(&mut self) -> Option<&mut UpiCheckout> {
        self.upi.as_mut()
    }

    pub(crate) fn into_parts(self) -> (Option<Money>, Option<UpiCheckout>) {
        (self.cash_received, self.upi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cash_validity() {
        let total = Money::from_minor(21_240);
        assert!(is_payment_valid(PaymentMethod::Cash, Some(total), total));
        assert!(!is_payment_valid(
            PaymentMethod::Cash,
            Some(Money::from_minor(21_239)),
            total
        ));
        assert!(!is_payment_valid(PaymentMethod::Cash, None, total));
    }

    #[test]
    fn test_card_and_upi_always_valid() {
        let total = Money::from_major(500);
        assert!(is_payment_valid(PaymentMethod::Card, None, total));
        assert!(is_payment_valid(PaymentMethod::Upi, Some(Money::zero()), total));
    }

    #[test]
    fn test_change_amount() {
        let total = Money::from_minor(21_240);
        assert_eq!(change_amount(Money::from_major(250), total).to_fixed(), "37.60");
        assert_eq!(change_amount(Money::from_major(100), total), Money::zero());
    }

    #[test]
    fn test_editing_allowed_states() {
        assert!(PaymentState::NoMethodSelected.allows_editing());
        assert!(PaymentState::Cancelled.allows_editing());
        assert!(!PaymentState::AwaitingConfirmation.allows_editing());
        assert!(!PaymentState::Confirmed.allows_editing());
    }
}
