//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                     │
//! │                                                                 │
//! │  In JavaScript/floating point:                                  │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                   │
//! │                                                                 │
//! │  OUR SOLUTION: i64 whole pesos                                  │
//! │    Colombian pesos carry no fractional unit in practice, so     │
//! │    every amount in the system is an exact integer.              │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cantina_core::money::Money;
//!
//! let cost = Money::from_pesos(2_000);
//! let total = cost * 48;
//! assert_eq!(total.pesos(), 96_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole pesos.
///
/// ## Design Decisions
/// - **i64 (signed)**: a worker's net payable can go negative when loans
///   exceed earnings, and the cash balance can dip below zero
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole pesos.
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    ///
    /// let price = Money::from_pesos(3_500);
    /// assert_eq!(price.pesos(), 3_500);
    /// ```
    #[inline]
    pub const fn from_pesos(pesos: i64) -> Self {
        Money(pesos)
    }

    /// Returns the value in whole pesos.
    #[inline]
    pub const fn pesos(&self) -> i64 {
        self.0
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

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a unit count.
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    ///
    /// let unit_price = Money::from_pesos(2_000);
    /// let line_total = unit_price.multiply_units(48);
    /// assert_eq!(line_total.pesos(), 96_000);
    /// ```
    #[inline]
    pub const fn multiply_units(&self, units: i64) -> Self {
        Money(self.0 * units)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money in a human-readable format with thousands separators,
/// matching how amounts read on Colombian receipts (`$96.000`).
///
/// This is for logs and debugging. The view layer formats amounts for actual
/// display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.0.abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(c);
        }
        write!(f, "{}${}", sign, grouped)
    }
}

/// Default money is zero.
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

/// Multiplication by integer (for unit-count calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, units: i64) -> Self {
        Money(self.0 * units)
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Summation over iterators of Money (shift totals, ledger sums).
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pesos() {
        let money = Money::from_pesos(96_000);
        assert_eq!(money.pesos(), 96_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_pesos(96_000)), "$96.000");
        assert_eq!(format!("{}", Money::from_pesos(500)), "$500");
        assert_eq!(format!("{}", Money::from_pesos(1_234_567)), "$1.234.567");
        assert_eq!(format!("{}", Money::from_pesos(-2_000)), "-$2.000");
        assert_eq!(format!("{}", Money::from_pesos(0)), "$0");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_pesos(30_000);
        let b = Money::from_pesos(5_000);

        assert_eq!((a + b).pesos(), 35_000);
        assert_eq!((a - b).pesos(), 25_000);
        assert_eq!((b * 3).pesos(), 15_000);
        assert_eq!((-b).pesos(), -5_000);
    }

    #[test]
    fn test_multiply_units() {
        let unit_cost = Money::from_pesos(2_000);
        assert_eq!(unit_cost.multiply_units(48).pesos(), 96_000);
    }

    #[test]
    fn test_sum() {
        let total: Money = [1_000, 2_500, 500]
            .iter()
            .map(|p| Money::from_pesos(*p))
            .sum();
        assert_eq!(total.pesos(), 4_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        // Net payable below zero: loans exceeded earnings.
        let negative = Money::from_pesos(30_000) - Money::from_pesos(40_000);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().pesos(), 10_000);
    }
}
