//! # Money Module
//!
//! Provides the `Money` type for prices, costs and revenue figures.
//!
//! ## Whole Currency Units
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  CLP HAS NO MINOR UNIT                                                  │
//! │                                                                         │
//! │  Every price in the catalog is a whole number of pesos:                 │
//! │    Ramen Tonkotsu Premium   8.500 CLP                                   │
//! │    Booster Box            145.000 CLP                                   │
//! │                                                                         │
//! │  Fractional intermediate values (cost × margin, averages) are          │
//! │  computed in f64 and rounded half-up back into Money exactly once.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockroom_core::money::Money;
//!
//! let price = Money::from_units(8500);
//! let line_total = price * 3;
//! assert_eq!(line_total.units(), 25500);
//!
//! // 6000 × 1.35 = 8100.000000000001 → 8100
//! assert_eq!(Money::round_half_up(6000.0 * 1.35).units(), 8100);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Whole pesos. Signed, since price deltas in recommendations can be negative.
///
/// Arithmetic saturates at the `i64` bounds: a catalog with absurd quantities
/// reports `i64::MAX` pesos instead of overflowing.
///
/// Serialized as a bare number. Deserialization accepts the floats and numeric
/// strings older dashboards wrote and rounds them; anything else reads as 0.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_units(units: i64) -> Self {
        Money(units)
    }

    #[inline]
    pub const fn units(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// `floor(x + 0.5)`; NaN and infinities give zero.
    ///
    /// ```rust
    /// use stockroom_core::money::Money;
    ///
    /// assert_eq!(Money::round_half_up(2.5).units(), 3);
    /// assert_eq!(Money::round_half_up(-2.5).units(), -2);
    /// assert_eq!(Money::round_half_up(f64::NAN).units(), 0);
    /// ```
    pub fn round_half_up(value: f64) -> Self {
        Money(round_half_up(value))
    }

    /// For ratios (margins, averages). Convert back with [`Money::round_half_up`].
    #[inline]
    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Line total: `8.500 CLP × 3 = 25.500 CLP`. Saturating.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

/// Integer half-up rounding shared by the money and count coercions.
pub fn round_half_up(value: f64) -> i64 {
    if value.is_finite() {
        (value + 0.5).floor() as i64
    } else {
        0
    }
}

// =============================================================================
// Formatting and Serde
// =============================================================================

/// `1.234.567 CLP`: thousands grouped with dots.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let first = match digits.len() % 3 {
            0 => 3,
            n => n,
        };

        if self.0 < 0 {
            f.write_str("-")?;
        }
        f.write_str(&digits[..first])?;
        for group in digits.as_bytes()[first..].chunks(3) {
            f.write_str(".")?;
            f.write_str(std::str::from_utf8(group).map_err(|_| fmt::Error)?)?;
        }
        write!(f, " {}", crate::CURRENCY)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Stored {
            Whole(i64),
            Fraction(f64),
            Text(String),
            Junk(serde_json::Value),
        }

        Ok(match Stored::deserialize(deserializer)? {
            Stored::Whole(units) => Money(units),
            Stored::Fraction(value) => Money::round_half_up(value),
            Stored::Text(text) => Money::round_half_up(text.trim().parse().unwrap_or(0.0)),
            Stored::Junk(_) => Money::zero(),
        })
    }
}

// =============================================================================
// Arithmetic
// =============================================================================

macro_rules! money_op {
    ($op:ident, $method:ident, $assign:ident, $assign_method:ident, $saturating:ident) => {
        impl $op for Money {
            type Output = Money;

            #[inline]
            fn $method(self, rhs: Money) -> Money {
                Money(self.0.$saturating(rhs.0))
            }
        }

        impl $assign for Money {
            #[inline]
            fn $assign_method(&mut self, rhs: Money) {
                self.0 = self.0.$saturating(rhs.0);
            }
        }
    };
}

money_op!(Add, add, AddAssign, add_assign, saturating_add);
money_op!(Sub, sub, SubAssign, sub_assign, saturating_sub);

/// Price times quantity.
impl Mul<i64> for Money {
    type Output = Money;

    #[inline]
    fn mul(self, qty: i64) -> Money {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |total, m| total + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Money::from_units(12345).to_string(), "12.345 CLP");
        assert_eq!(Money::from_units(145000).to_string(), "145.000 CLP");
        assert_eq!(Money::from_units(1234567).to_string(), "1.234.567 CLP");
        assert_eq!(Money::from_units(999).to_string(), "999 CLP");
        assert_eq!(Money::from_units(0).to_string(), "0 CLP");
        assert_eq!(Money::from_units(-2500).to_string(), "-2.500 CLP");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_units(1000);
        let b = Money::from_units(500);

        assert_eq!((a + b).units(), 1500);
        assert_eq!((a - b).units(), 500);
        assert_eq!((a * 3).units(), 3000);
        assert_eq!((b - a).units(), -500);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(Money::round_half_up(1300.0).units(), 1300);
        assert_eq!(Money::round_half_up(1299.5).units(), 1300);
        assert_eq!(Money::round_half_up(1299.49).units(), 1299);
        assert_eq!(Money::round_half_up(f64::INFINITY).units(), 0);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let max = Money::from_units(i64::MAX);
        assert_eq!(Money::from_units(100).multiply_quantity(9_000_000_000_000_000_000), max);
        assert_eq!(max + Money::from_units(1), max);
        assert_eq!(Money::from_units(i64::MIN) - Money::from_units(1), Money::from_units(i64::MIN));

        let mut total = max;
        total += Money::from_units(5);
        assert_eq!(total, max);
        assert_eq!([max, max].iter().sum::<Money>(), max);
    }

    #[test]
    fn test_sum() {
        let prices = [Money::from_units(100), Money::from_units(250)];
        let total: Money = prices.iter().sum();
        assert_eq!(total.units(), 350);
    }

    #[test]
    fn test_lenient_deserialize() {
        let whole: Money = serde_json::from_str("8500").unwrap();
        assert_eq!(whole.units(), 8500);

        let fractional: Money = serde_json::from_str("8499.6").unwrap();
        assert_eq!(fractional.units(), 8500);

        let text: Money = serde_json::from_str("\"1200\"").unwrap();
        assert_eq!(text.units(), 1200);

        let garbage: Money = serde_json::from_str("\"abc\"").unwrap();
        assert!(garbage.is_zero());

        let null: Money = serde_json::from_str("null").unwrap();
        assert!(null.is_zero());
    }

    #[test]
    fn test_serializes_as_bare_number() {
        assert_eq!(serde_json::to_string(&Money::from_units(42)).unwrap(), "42");
    }
}
