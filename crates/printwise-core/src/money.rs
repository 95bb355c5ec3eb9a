//! # Money Module
//!
//! Provides the `Money` type for stored monetary values.
//!
//! ## Integer Cents at Rest, Decimals in Flight
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  WHERE EACH REPRESENTATION LIVES                                        │
//! │                                                                         │
//! │  product.base_price  (Money, cents) ──► Decimal ──┐                     │
//! │                                                   │ quantity factor     │
//! │                                                   │ color factor        │
//! │                                                   │ finishing chain     │
//! │                                                   ▼                     │
//! │                             Money::from_decimal() ← ONLY rounding step  │
//! │                                                   │                     │
//! │  quote.unit_price (Money) × quantity ──► quote.total_price (Money)      │
//! │                                                                         │
//! │  total = unit × quantity is exact in cents, never re-rounded            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use printwise_core::money::Money;
//! use rust_decimal::Decimal;
//!
//! let unit = Money::from_decimal(Decimal::new(6399, 3)).unwrap(); // 6.399
//! assert_eq!(unit.cents(), 640);
//!
//! let total = unit.checked_multiply_quantity(600).unwrap();
//! assert_eq!(total.cents(), 384_000);
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in cents (EUR).
///
/// ## Design Decisions
/// - **i64 (signed)**: matches SQLite INTEGER, leaves headroom for large jobs
/// - **Single field tuple struct**: serializes as a plain integer
/// - **No float constructor**: amounts enter either as cents or through
///   [`Money::from_decimal`], which owns the rounding rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Converts an exact decimal amount to Money.
    ///
    /// Rounds to 2 decimal places, half away from zero (10.005 → 10.01,
    /// -10.005 → -10.01). Returns `None` when the amount does not fit.
    ///
    /// ## Example
    /// ```rust
    /// use printwise_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Money::from_decimal(Decimal::new(10005, 3)).unwrap().cents(), 1001);
    /// assert_eq!(Money::from_decimal(Decimal::new(25, 1)).unwrap().cents(), 250);
    /// ```
    pub fn from_decimal(amount: Decimal) -> Option<Self> {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Money)
    }

    /// Returns the exact decimal value (scale 2).
    #[inline]
    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-euro portion.
    #[inline]
    pub const fn euros(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies a unit price by a quantity, `None` on overflow.
    ///
    /// ## User Workflow
    /// ```text
    /// Unit price: 6.40
    /// Quantity:   600
    ///      │
    ///      ▼
    /// checked_multiply_quantity(600) ← THIS FUNCTION
    ///      │
    ///      ▼
    /// Total price: 3840.00
    /// ```
    #[inline]
    pub fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(qty).map(Money)
    }

    /// Formats the amount the way quotes are shown to clients:
    /// `.` thousands separator, `,` decimal separator, trailing euro sign.
    ///
    /// ## Example
    /// ```rust
    /// use printwise_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(123_456).format_eur(), "1.234,56 €");
    /// assert_eq!(Money::from_cents(640).format_eur(), "6,40 €");
    /// ```
    pub fn format_eur(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.euros().abs().to_string();
        let len = digits.len();

        let mut grouped = String::with_capacity(len + len / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }

        format!("{}{},{:02} €", sign, grouped, self.cents_part())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal rendering (`1234.56`), used in logs and JSON strings.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.euros().abs(), self.cents_part())
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

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.euros(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_decimal_rounds_half_away_from_zero() {
        assert_eq!(Money::from_decimal(Decimal::new(10005, 3)).unwrap().cents(), 1001);
        assert_eq!(Money::from_decimal(Decimal::new(10004, 3)).unwrap().cents(), 1000);
        assert_eq!(Money::from_decimal(Decimal::new(-10005, 3)).unwrap().cents(), -1001);
        // Banker's rounding would give 2.34 here
        assert_eq!(Money::from_decimal(Decimal::new(2345, 3)).unwrap().cents(), 235);
    }

    #[test]
    fn test_from_decimal_low_scale() {
        assert_eq!(Money::from_decimal(Decimal::TEN).unwrap().cents(), 1000);
        assert_eq!(Money::from_decimal(Decimal::new(64, 1)).unwrap().cents(), 640);
    }

    #[test]
    fn test_from_decimal_overflow() {
        assert!(Money::from_decimal(Decimal::MAX).is_none());
    }

    #[test]
    fn test_to_decimal() {
        assert_eq!(Money::from_cents(640).to_decimal(), Decimal::new(64, 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::zero()), "0.00");
    }

    #[test]
    fn test_format_eur() {
        assert_eq!(Money::from_cents(0).format_eur(), "0,00 €");
        assert_eq!(Money::from_cents(100_000).format_eur(), "1.000,00 €");
        assert_eq!(Money::from_cents(123_456_789).format_eur(), "1.234.567,89 €");
        assert_eq!(Money::from_cents(-123_456).format_eur(), "-1.234,56 €");
    }

    #[test]
    fn test_multiply_quantity() {
        let unit = Money::from_cents(1000);
        assert_eq!(unit.checked_multiply_quantity(50).unwrap().cents(), 50_000);
        assert!(Money::from_cents(i64::MAX).checked_multiply_quantity(2).is_none());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);
        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert!((b - a).is_negative());
    }
}
