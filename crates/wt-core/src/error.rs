//! # Error Types
//!
//! Domain-specific error types for wt-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  wt-core errors (this file)                                            │
//! │  ├── CoreError        - Checkout state / precondition violations       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  wt-api errors (separate crate)                                        │
//! │  └── ClientError      - Backend, QR service, export failures           │
//! │                                                                         │
//! │  terminal errors (in app)                                              │
//! │  └── CommandError     - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError ─┐                                  │
//! │                          ClientError ┴─► CommandError → Operator       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## What is NOT an error
//! Stock limits are not errors. Adding past the stock snapshot or setting a
//! quantity above it leaves the cart unchanged and reports
//! [`crate::cart::CartChange::Ignored`].

use thiserror::Error;

use crate::payment::PaymentState;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// A line index does not address an item in the bill.
    #[error("Line {index} does not exist (bill has {len} items)")]
    LineIndexOutOfRange { index: usize, len: usize },

    /// The bill was confirmed and can no longer change.
    #[error("Bill {bill_number} is confirmed and cannot be modified")]
    BillFrozen { bill_number: String },

    /// The cart is locked while a payment is awaiting confirmation.
    #[error("Checkout in progress; cancel the payment to edit the bill")]
    CheckoutInProgress,

    /// Checkout requested on a bill without items.
    #[error("Bill has no items")]
    EmptyBill,

    /// Checkout requested before a payment method was chosen.
    #[error("Select a payment method first")]
    NoPaymentMethod,

    /// The validity predicate rejected the payment.
    ///
    /// ## When This Occurs
    /// ```text
    /// Total: ₹212.40
    /// Cash received: ₹200.00
    ///      │
    ///      ▼
    /// PaymentInvalid { reason: "cash received ₹200.00 is less than total ₹212.40" }
    /// ```
    #[error("Payment cannot be confirmed: {reason}")]
    PaymentInvalid { reason: String },

    /// A state machine transition that is not allowed from the current state.
    #[error("Cannot {action} while payment is {state:?}")]
    InvalidTransition {
        action: &'static str,
        state: PaymentState,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before business logic runs.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., malformed UPI id, phone number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::LineIndexOutOfRange { index: 3, len: 2 };
        assert_eq!(err.to_string(), "Line 3 does not exist (bill has 2 items)");

        let err = CoreError::InvalidTransition {
            action: "cancel payment",
            state: PaymentState::Confirmed,
        };
        assert_eq!(err.to_string(), "Cannot cancel payment while payment is Confirmed");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::TooLong {
            field: "note".to_string(),
            max: 255,
        };
        assert_eq!(err.to_string(), "note must be at most 255 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "phone".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
