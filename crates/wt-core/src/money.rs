//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In JavaScript/floating point:                                          │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A bill recomputes discount and 18% GST on every cart change.           │
//! │  Rounding each intermediate value to paise would let the error          │
//! │  compound across recomputations.                                        │
//! │                                                                         │
//! │  OUR SOLUTION: Exact decimals, rounded once                             │
//! │    200.00 × 10%      = 20.00                                           │
//! │    180.00 × 18%      = 32.4000  (kept exact)                           │
//! │    round_to_minor()  = 32.40    (only for display / persistence)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use wt_core::money::Money;
//!
//! let price = Money::from_minor(10_000); // ₹100.00
//! let line = price * 2;                  // ₹200.00
//! assert_eq!(line.to_fixed(), "200.00");
//! assert_eq!(line.to_string(), "₹200.00");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use std::str::FromStr;

use crate::types::{DiscountPercent, TaxRate};

/// Number of fractional digits in the currency (paise).
pub const MINOR_DIGITS: u32 = 2;

/// Currency symbol printed on receipts and notes.
pub const CURRENCY_SYMBOL: &str = "₹";

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in rupees, held as an exact decimal.
///
/// ## Design Decisions
/// - **Decimal, not cents**: discount and tax produce sub-paise values that
///   must survive until the final rounding step
/// - **Single field tuple struct**: zero-cost wrapper over `Decimal`
/// - **Serialized as a JSON number**: matches the backend wire format
///
/// ## Where Money is Used
/// ```text
/// Product.price ──► LineItem.subtotal ──► Bill.subtotal
///                                              │
///                         discount ◄───────────┤
///                         tax      ◄───────────┤
///                         total    ◄───────────┘ ──► UPI `am`, receipt, payload
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Money {
    /// Creates a Money value from minor units (paise).
    ///
    /// ## Example
    /// ```rust
    /// use wt_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // ₹10.99
    /// assert_eq!(price.to_fixed(), "10.99");
    /// ```
    #[inline]
    pub fn from_minor(minor: i64) -> Self {
        Money(Decimal::new(minor, MINOR_DIGITS))
    }

    /// Creates a Money value from whole rupees.
    #[inline]
    pub fn from_major(major: i64) -> Self {
        Money(Decimal::from(major))
    }

    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Returns the exact decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds to whole paise, half away from zero.
    ///
    /// This is the ONLY rounding step in the billing pipeline. It is applied
    /// when a value leaves the engine: display, notes, persistence, exports.
    ///
    /// ## Example
    /// ```rust
    /// use wt_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let tax = Money::from_decimal(Decimal::new(1_2345, 3)); // 12.345
    /// assert_eq!(tax.round_to_minor(), Money::from_minor(1235));
    /// ```
    pub fn round_to_minor(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(MINOR_DIGITS, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Formats the rounded amount with exactly two fractional digits and no symbol.
    ///
    /// Used for the UPI `am` field and compact notes.
    pub fn to_fixed(&self) -> String {
        format!("{:.2}", self.round_to_minor().0)
    }

    /// Calculates tax at the given rate, exactly.
    ///
    /// ## Example
    /// ```rust
    /// use wt_core::money::Money;
    /// use wt_core::types::TaxRate;
    ///
    /// let taxable = Money::from_major(180);
    /// let tax = taxable.calculate_tax(TaxRate::GST); // 18%
    /// assert_eq!(tax.to_fixed(), "32.40");
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money(self.0 * rate.as_fraction())
    }

    /// Multiplies money by a quantity.
    ///
    /// ```text
    /// Product: Notebook ₹45.50
    /// Quantity: 3
    ///      │
    ///      ▼
    /// multiply_quantity(3) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Line subtotal: ₹136.50
    /// ```
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0 * Decimal::from(qty))
    }

    /// Returns the discount amount for a percentage, exactly.
    ///
    /// ## Example
    /// ```rust
    /// use wt_core::money::Money;
    /// use wt_core::types::DiscountPercent;
    ///
    /// let subtotal = Money::from_major(200);
    /// let discount = subtotal.percentage(DiscountPercent::from_whole(10));
    /// assert_eq!(discount, Money::from_major(20));
    /// ```
    pub fn percentage(&self, percent: DiscountPercent) -> Money {
        Money(self.0 * percent.as_fraction())
    }

    /// Returns `self - other`, floored at zero.
    pub fn saturating_sub(self, other: Money) -> Money {
        if other >= self {
            Money::zero()
        } else {
            self - other
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount rounded to paise with the rupee symbol, e.g. `₹212.40`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rounded = self.round_to_minor().0;
        if rounded.is_sign_negative() && !rounded.is_zero() {
            write!(f, "-{}{:.2}", CURRENCY_SYMBOL, rounded.abs())
        } else {
            write!(f, "{}{:.2}", CURRENCY_SYMBOL, rounded)
        }
    }
}

/// Parses operator input such as `250`, `250.5` or `₹250.50`.
impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches(CURRENCY_SYMBOL).trim();
        Decimal::from_str(trimmed).map(Money)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
