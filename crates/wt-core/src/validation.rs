//! # Validation Module
//!
//! Input validation utilities for WalletTracker POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Operator console                                             │
//! │  └── Parsing (numbers, payment method names)                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE: business rule validation                        │
//! │  ├── Product edits, customer phone, UPI payee                          │
//! │  └── Note length for payment apps                                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend API                                                  │
//! │  └── Stock deduction, uniqueness, ownership                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use wt_core::validation::{validate_customer_phone, validate_upi_vpa};
//!
//! assert!(validate_customer_phone("+91 98765 43210").is_ok());
//! assert!(validate_upi_vpa("shop@okicici").is_ok());
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Note length most UPI apps accept in the `tn` field.
pub const DEFAULT_UPI_NOTE_LIMIT: usize = 255;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a product category.
pub fn validate_category(category: &str) -> ValidationResult<()> {
    let category = category.trim();

    if category.is_empty() {
        return Err(ValidationError::Required {
            field: "category".to_string(),
        });
    }

    if category.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "category".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates a barcode: 4 to 64 alphanumeric characters.
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.len() < 4 || barcode.len() > 64 {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must be 4 to 64 characters".to_string(),
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only letters and digits".to_string(),
        });
    }

    Ok(())
}

/// Validates an optional customer phone number.
///
/// ## Rules
/// - Optional leading `+`
/// - Spaces and hyphens are ignored
/// - 7 to 15 digits (E.164 upper bound)
///
/// ## Returns
/// The phone number with separators stripped.
pub fn validate_customer_phone(phone: &str) -> ValidationResult<String> {
    let trimmed = phone.trim();
    let (plus, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let digits: String = rest.chars().filter(|c| *c != ' ' && *c != '-').collect();

    if digits.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if !digits.chars().all(|c| c.is_ascii_digit()) || digits.len() < 7 || digits.len() > 15 {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must be 7 to 15 digits".to_string(),
        });
    }

    Ok(format!("{}{}", plus, digits))
}

/// Validates a UPI virtual payment address (`handle@provider`).
///
/// ## Example
/// ```rust
/// use wt_core::validation::validate_upi_vpa;
///
/// assert!(validate_upi_vpa("store.counter1@okhdfc").is_ok());
/// assert!(validate_upi_vpa("no-at-sign").is_err());
/// ```
pub fn validate_upi_vpa(vpa: &str) -> ValidationResult<()> {
    let invalid = |reason: &str| ValidationError::InvalidFormat {
        field: "upi id".to_string(),
        reason: reason.to_string(),
    };

    let (handle, provider) = vpa
        .trim()
        .split_once('@')
        .ok_or_else(|| invalid("must look like name@bank"))?;

    if handle.is_empty() || provider.is_empty() {
        return Err(invalid("must look like name@bank"));
    }

    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_');
    if !handle.chars().all(allowed) || !provider.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(invalid("contains unsupported characters"));
    }

    Ok(())
}

/// Checks that a UPI transaction note fits the payment app limit.
pub fn validate_note_length(note: &str, limit: usize) -> ValidationResult<()> {
    if note.chars().count() > limit {
        return Err(ValidationError::TooLong {
            field: "upi note".to_string(),
            max: limit,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price or cost.
///
/// ## Rules
/// - Must be non-negative
/// - Zero is allowed (free items)
pub fn validate_price(price: Money) -> ValidationResult<()> {
    if price.is_negative() {
        return Err(ValidationError::Negative {
            field: "price".to_string(),
        });
    }

    Ok(())
}

/// Validates a cash amount tendered by the customer.
pub fn validate_cash_received(amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: "cash received".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Basmati Rice 1kg").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("8901234567890").is_ok());
        assert!(validate_barcode("12").is_err());
        assert!(validate_barcode("8901-2345").is_err());
    }

    #[test]
    fn test_validate_customer_phone() {
        assert_eq!(validate_customer_phone("98765 43210").unwrap(), "9876543210");
        assert_eq!(validate_customer_phone("+91-98765-43210").unwrap(), "+919876543210");
        assert!(validate_customer_phone("").is_err());
        assert!(validate_customer_phone("12ab567").is_err());
        assert!(validate_customer_phone("123").is_err());
    }

    #[test]
    fn test_validate_upi_vpa() {
        assert!(validate_upi_vpa("sbragul26@okicici").is_ok());
        assert!(validate_upi_vpa("@okicici").is_err());
        assert!(validate_upi_vpa("shop@").is_err());
        assert!(validate_upi_vpa("sh op@bank").is_err());
    }

    #[test]
    fn test_validate_note_length() {
        assert!(validate_note_length("short", 10).is_ok());
        assert!(validate_note_length("₹₹₹₹₹", 5).is_ok());
        assert!(validate_note_length("too long for it", 10).is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Money::zero()).is_ok());
        assert!(validate_price(Money::from_minor(1099)).is_ok());
        assert!(validate_price(Money::from_minor(-100)).is_err());
    }
}
