//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A ledger that compares a remaining balance against a payment total    │
//! │  cannot afford that: a customer paying off a debt to the cent would    │
//! │  be rejected for "overpaying" by 0.0000000001.                          │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    1000 cents / 3 = 333 cents (×3 = 999 cents)                          │
//! │    We KNOW where the lost cent went, and assign it explicitly          │
//! │    (see `split_even` and `share_of`).                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use fiado_core::money::Money;
//!
//! // Create from cents (preferred)
//! let debt = Money::from_cents(1099); // $10.99
//!
//! // Parse operator input at the boundary (at most 2 decimal places)
//! let typed = Money::parse("10.99").unwrap();
//! assert_eq!(typed, debt);
//! assert!(Money::parse("10.999").is_err());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative intermediate values (a balance that
///   went one epsilon below zero is still representable and detectable)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// Every monetary value in the ledger flows through this type: sale totals,
/// payment amounts, split allocations, daily register totals and profit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use fiado_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
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

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the larger of `self` and `other`.
    #[inline]
    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// Parses an operator-typed decimal string into Money.
    ///
    /// This is the typed boundary parser that replaces ad hoc regex checks
    /// on currency strings. Accepted shape: digits, optionally followed by a
    /// decimal point and one or two decimal digits. Nothing else.
    ///
    /// ## Rules
    /// - `"10"` → 1000 cents
    /// - `"10.5"` → 1050 cents
    /// - `"10.99"` → 1099 cents
    /// - `"10.999"` → error (more than 2 decimal places)
    /// - `"-1"`, `""`, `"1,50"`, `"abc"` → error
    ///
    /// ## Example
    /// ```rust
    /// use fiado_core::money::Money;
    ///
    /// assert_eq!(Money::parse("10.99").unwrap().cents(), 1099);
    /// assert!(Money::parse("10.999").is_err());
    /// ```
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let s = input.trim();

        if s.is_empty() {
            return Err(ValidationError::InvalidAmount {
                input: input.to_string(),
                reason: "amount is empty".to_string(),
            });
        }

        let (whole, frac) = match s.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (s, None),
        };

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(ValidationError::InvalidAmount {
                input: input.to_string(),
                reason: "must be a non-negative number".to_string(),
            });
        }

        let frac_cents = match frac {
            None => 0,
            Some(f) if f.is_empty() => {
                return Err(ValidationError::InvalidAmount {
                    input: input.to_string(),
                    reason: "missing digits after decimal point".to_string(),
                })
            }
            Some(f) if f.len() > 2 => {
                return Err(ValidationError::InvalidAmount {
                    input: input.to_string(),
                    reason: "at most 2 decimal places allowed".to_string(),
                })
            }
            Some(f) => {
                if !f.chars().all(|c| c.is_ascii_digit()) {
                    return Err(ValidationError::InvalidAmount {
                        input: input.to_string(),
                        reason: "must be a non-negative number".to_string(),
                    });
                }
                let parsed: i64 = f.parse().map_err(|_| ValidationError::InvalidAmount {
                    input: input.to_string(),
                    reason: "invalid decimal digits".to_string(),
                })?;
                // "5" after the point means 50 cents, "05" means 5 cents
                if f.len() == 1 {
                    parsed * 10
                } else {
                    parsed
                }
            }
        };

        let whole_units: i64 = whole.parse().map_err(|_| ValidationError::InvalidAmount {
            input: input.to_string(),
            reason: "amount too large".to_string(),
        })?;

        whole_units
            .checked_mul(100)
            .and_then(|c| c.checked_add(frac_cents))
            .map(Money)
            .ok_or_else(|| ValidationError::InvalidAmount {
                input: input.to_string(),
                reason: "amount too large".to_string(),
            })
    }

    /// Splits this amount evenly into `n` parts, conserving the total.
    ///
    /// Uses largest-remainder allocation: every part gets `total / n`, and
    /// the leftover cents go one-by-one to the first parts. The parts always
    /// sum back to `self` exactly.
    ///
    /// ## Example
    /// ```rust
    /// use fiado_core::money::Money;
    ///
    /// let parts = Money::from_cents(1000).split_even(3);
    /// assert_eq!(
    ///     parts.iter().map(Money::cents).collect::<Vec<_>>(),
    ///     vec![334, 333, 333]
    /// );
    /// ```
    pub fn split_even(&self, n: usize) -> Vec<Money> {
        if n == 0 {
            return Vec::new();
        }

        let n = n as i64;
        let base = self.0.div_euclid(n);
        let remainder = self.0.rem_euclid(n);

        (0..n)
            .map(|i| {
                if i < remainder {
                    Money(base + 1)
                } else {
                    Money(base)
                }
            })
            .collect()
    }

    /// Returns the share of `self` proportional to `part / whole`.
    ///
    /// Used for profit attribution across a settlement's payment splits:
    /// a split covering 30% of the settled amount carries 30% of the profit.
    /// Rounds to the nearest cent; callers that need exact conservation
    /// assign the remainder to the final share (see `cash::settlement_movements`).
    ///
    /// Returns zero when `whole` is zero.
    pub fn share_of(&self, part: Money, whole: Money) -> Money {
        if whole.is_zero() {
            return Money::zero();
        }

        // i128 to prevent overflow on large amounts
        let numerator = self.0 as i128 * part.0 as i128;
        let denominator = whole.0 as i128;
        // round-half-away-from-zero
        let half = denominator.abs() / 2;
        let rounded = if numerator >= 0 {
            (numerator + half) / denominator
        } else {
            (numerator - half) / denominator
        };
        Money(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logging and receipts in tests. UI formatting and
/// localization happen outside this crate.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.units().abs(), self.cents_part())
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

/// Sums an iterator of Money values.
impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
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
        assert_eq!(money.units(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_parse_whole_and_decimals() {
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("10.05").unwrap().cents(), 1005);
        assert_eq!(Money::parse("10.99").unwrap().cents(), 1099);
        assert_eq!(Money::parse("0").unwrap().cents(), 0);
        assert_eq!(Money::parse(" 3.20 ").unwrap().cents(), 320);
    }

    #[test]
    fn test_parse_rejects_three_decimals() {
        // "10.999" must fail before any balance comparison happens
        assert!(Money::parse("10.999").is_err());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("   ").is_err());
        assert!(Money::parse("-1").is_err());
        assert!(Money::parse("1,50").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("10.").is_err());
        assert!(Money::parse(".5").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("99999999999999999999").is_err());
    }

    #[test]
    fn test_split_even_conserves_total() {
        let total = Money::from_cents(1000);
        for n in 1..=5 {
            let parts = total.split_even(n);
            assert_eq!(parts.len(), n);
            let sum: Money = parts.iter().copied().sum();
            assert_eq!(sum, total, "split into {n} parts lost money");
        }
    }

    #[test]
    fn test_split_even_largest_remainder() {
        let parts = Money::from_cents(1000).split_even(3);
        assert_eq!(
            parts.iter().map(Money::cents).collect::<Vec<_>>(),
            vec![334, 333, 333]
        );
    }

    #[test]
    fn test_split_even_zero_parts() {
        assert!(Money::from_cents(100).split_even(0).is_empty());
    }

    #[test]
    fn test_share_of() {
        let profit = Money::from_cents(900);
        // split covering 300 of a 600 settlement carries half the profit
        let share = profit.share_of(Money::from_cents(300), Money::from_cents(600));
        assert_eq!(share.cents(), 450);

        // zero denominator yields zero, not a panic
        let share = profit.share_of(Money::from_cents(300), Money::zero());
        assert!(share.is_zero());
    }
}
