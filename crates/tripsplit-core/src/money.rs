//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Summing trip expenses as floats:                                       │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Splitting $100.00 three ways:                                          │
//! │    33.333... each, rounded ad hoc at every call site → drift            │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents + one rounding rule                        │
//! │    Sums are exact. Fractions of a cent are carried as exact ratios      │
//! │    and rounded ONCE, half away from zero, by `from_ratio_rounded`.      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tripsplit_core::money::Money;
//!
//! // Create from cents (preferred)
//! let dinner = Money::from_cents(15050); // $150.50
//!
//! // Parse user input at the boundary
//! let taxi: Money = "23.4".parse().unwrap();
//! assert_eq!(taxi.cents(), 2340);
//!
//! let total = dinner + taxi;
//! assert_eq!(total.to_string(), "$173.90");
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Balances are signed (creditor > 0, debtor < 0)
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **JSON as decimal currency**: serialized as `150.5`, read back through
///   `try_from_f64`. Rows store `*_cents` integers instead.
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Expense.amount ──► total ──► per-person share ──► Balance.amount       │
/// │                                                          │              │
/// │                                                          ▼              │
/// │                                   Transfer.amount ──► PaymentRecord     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, TS)]
#[ts(export, type = "number")]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use tripsplit_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (dollars and cents).
    ///
    /// ## Example
    /// ```rust
    /// use tripsplit_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(150, 50).cents(), 15050);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Converts a floating point amount to cents, rounding half away from zero.
    ///
    /// This is the only place a float may enter the system. JSON numbers
    /// from a form come through here via `Deserialize`. NaN and infinities
    /// are rejected.
    ///
    /// ## Example
    /// ```rust
    /// use tripsplit_core::money::Money;
    ///
    /// assert_eq!(Money::try_from_f64(150.5).unwrap().cents(), 15050);
    /// assert_eq!(Money::try_from_f64(0.125).unwrap().cents(), 13);
    /// assert!(Money::try_from_f64(f64::NAN).is_err());
    /// ```
    pub fn try_from_f64(value: f64) -> Result<Self, ValidationError> {
        if !value.is_finite() {
            return Err(ValidationError::NotFinite {
                field: "amount".to_string(),
            });
        }

        // f64::round is half away from zero
        let cents = (value * 100.0).round();
        // i64::MAX as f64 rounds up to 2^63, which is already out of range
        if cents >= i64::MAX as f64 || cents < i64::MIN as f64 {
            return Err(ValidationError::OutOfRange {
                field: "amount".to_string(),
                min: i64::MIN / 100,
                max: i64::MAX / 100,
            });
        }

        Ok(Money(cents as i64))
    }

    /// Builds a Money value from an exact ratio of cents, rounding half away
    /// from zero.
    ///
    /// `numerator / denominator` is a cent amount that may carry a fraction
    /// of a cent (e.g. a per-person share of an odd total). Returns `None`
    /// when the denominator is zero or the result does not fit in i64.
    ///
    /// ## Example
    /// ```rust
    /// use tripsplit_core::money::Money;
    ///
    /// // 10000 cents / 3 = 3333.33.. → 3333
    /// assert_eq!(Money::from_ratio_rounded(10_000, 3).unwrap().cents(), 3333);
    /// // 5 / 2 = 2.5 → 3, -5 / 2 = -2.5 → -3
    /// assert_eq!(Money::from_ratio_rounded(5, 2).unwrap().cents(), 3);
    /// assert_eq!(Money::from_ratio_rounded(-5, 2).unwrap().cents(), -3);
    /// ```
    pub fn from_ratio_rounded(numerator: i128, denominator: i128) -> Option<Self> {
        if denominator == 0 {
            return None;
        }

        let negative = (numerator < 0) != (denominator < 0);
        let num = numerator.checked_abs()?;
        let den = denominator.checked_abs()?;

        let quotient = num / den;
        let remainder = num % den;
        // Remainder of at least half the denominator rounds away from zero
        let magnitude = if remainder >= den - remainder {
            quotient + 1
        } else {
            quotient
        };

        let signed = if negative { -magnitude } else { magnitude };
        i64::try_from(signed).ok().map(Money)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (dollars) portion.
    ///
    /// ## Example
    /// ```rust
    /// use tripsplit_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).dollars(), 10);
    /// assert_eq!(Money::from_cents(-550).dollars(), -5);
    /// ```
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns the value as a 2-decimal number for display and JSON output.
    ///
    /// ## Note
    /// Output boundary only. Never feed the result back into arithmetic.
    #[inline]
    pub fn to_decimal(&self) -> f64 {
        self.0 as f64 / 100.0
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

    /// Splits an amount evenly across `parts`, rounding half away from zero.
    ///
    /// `parts` is floored at 1 so an empty trip never divides by zero.
    ///
    /// ## Example
    /// ```rust
    /// use tripsplit_core::money::Money;
    ///
    /// let total = Money::from_cents(10_000);
    /// assert_eq!(total.split_evenly(3).cents(), 3333);
    /// assert_eq!(total.split_evenly(0).cents(), 10_000);
    /// ```
    pub fn split_evenly(&self, parts: usize) -> Money {
        let parts = parts.max(1) as i128;
        // |self| / parts <= |self|, so the result always fits
        Money::from_ratio_rounded(self.0 as i128, parts).unwrap_or(*self)
    }
}

// =============================================================================
// Parsing
// =============================================================================

/// Parses a decimal amount such as `"150.50"`, `"150.5"`, `"150"` or `"-3.10"`.
///
/// ## Rules
/// - At most two fractional digits (no silent rounding of typed input)
/// - Digits only, with one optional leading `-` and one optional `.`
/// - Surrounding whitespace is ignored
impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "amount".to_string(),
            reason: reason.to_string(),
        };

        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Required {
                field: "amount".to_string(),
            });
        }

        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (major_str, minor_str) = match digits.split_once('.') {
            Some((major, minor)) => (major, minor),
            None => (digits, ""),
        };

        if major_str.is_empty() && minor_str.is_empty() {
            return Err(invalid("must contain digits"));
        }
        if !major_str.chars().all(|c| c.is_ascii_digit())
            || !minor_str.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid("must be a decimal number"));
        }
        if minor_str.len() > 2 {
            return Err(invalid("must have at most two decimal places"));
        }

        let major: i64 = if major_str.is_empty() {
            0
        } else {
            major_str
                .parse()
                .map_err(|_| invalid("is too large"))?
        };
        let minor: i64 = match minor_str.len() {
            0 => 0,
            1 => minor_str.parse::<i64>().map_err(|_| invalid("is malformed"))? * 10,
            _ => minor_str.parse().map_err(|_| invalid("is malformed"))?,
        };

        let cents = major
            .checked_mul(100)
            .and_then(|c| c.checked_add(minor))
            .ok_or_else(|| invalid("is too large"))?;

        Ok(Money(if negative { -cents } else { cents }))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and the demo binary. Use frontend formatting for actual
/// UI display to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Serde: 2-decimal currency on the wire
// =============================================================================

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Integers are whole currency units: `150` is $150.00
        let value = f64::deserialize(deserializer)?;
        Money::try_from_f64(value).map_err(serde::de::Error::custom)
    }
}

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
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(50)), "$0.50");
        assert_eq!(format!("{}", Money::from_cents(-50)), "-$0.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_parse_valid_amounts() {
        assert_eq!("150.50".parse::<Money>().unwrap().cents(), 15050);
        assert_eq!("150.5".parse::<Money>().unwrap().cents(), 15050);
        assert_eq!("150".parse::<Money>().unwrap().cents(), 15000);
        assert_eq!(" 0.07 ".parse::<Money>().unwrap().cents(), 7);
        assert_eq!(".5".parse::<Money>().unwrap().cents(), 50);
        assert_eq!("-3.10".parse::<Money>().unwrap().cents(), -310);
    }

    #[test]
    fn test_parse_rejects_malformed_amounts() {
        assert!(matches!(
            "".parse::<Money>(),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            "abc".parse::<Money>(),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!("1.234".parse::<Money>().is_err());
        assert!("1e5".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
        assert!("1.2.3".parse::<Money>().is_err());
        assert!("99999999999999999999".parse::<Money>().is_err());
    }

    #[test]
    fn test_try_from_f64() {
        assert_eq!(Money::try_from_f64(300.0).unwrap().cents(), 30000);
        assert_eq!(Money::try_from_f64(0.1 + 0.2).unwrap().cents(), 30);
        assert_eq!(Money::try_from_f64(-0.125).unwrap().cents(), -13);
        assert!(matches!(
            Money::try_from_f64(f64::INFINITY),
            Err(ValidationError::NotFinite { .. })
        ));
        assert!(Money::try_from_f64(1e30).is_err());
    }

    #[test]
    fn test_try_from_f64_rejects_upper_edge() {
        // × 100 rounds to exactly 2^63 cents, one past i64::MAX
        let two_pow_63_cents = 92_233_720_368_547_760.0;
        assert!(matches!(
            Money::try_from_f64(two_pow_63_cents),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(Money::try_from_f64(-two_pow_63_cents).is_ok());
    }

    #[test]
    fn test_json_is_decimal_currency() {
        assert_eq!(
            serde_json::to_string(&Money::from_cents(15050)).unwrap(),
            "150.5"
        );
        assert_eq!(serde_json::to_string(&Money::from_cents(-7)).unwrap(), "-0.07");

        let half: Money = serde_json::from_str("150.5").unwrap();
        assert_eq!(half.cents(), 15050);
        let whole: Money = serde_json::from_str("150").unwrap();
        assert_eq!(whole.cents(), 15000);
        let cents: Money = serde_json::from_str("0.1").unwrap();
        assert_eq!(cents.cents(), 10);

        assert!(serde_json::from_str::<Money>("\"150\"").is_err());
    }

    #[test]
    fn test_ratio_rounding_half_away_from_zero() {
        assert_eq!(Money::from_ratio_rounded(1, 2).unwrap().cents(), 1);
        assert_eq!(Money::from_ratio_rounded(-1, 2).unwrap().cents(), -1);
        assert_eq!(Money::from_ratio_rounded(1, 3).unwrap().cents(), 0);
        assert_eq!(Money::from_ratio_rounded(2, 3).unwrap().cents(), 1);
        assert_eq!(Money::from_ratio_rounded(-2, 3).unwrap().cents(), -1);
        assert_eq!(Money::from_ratio_rounded(7, 1).unwrap().cents(), 7);
        assert!(Money::from_ratio_rounded(1, 0).is_none());
        assert!(Money::from_ratio_rounded(i128::MAX, 1).is_none());
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);

        let total: Money = vec![a, b, Money::from_cents(1)].into_iter().sum();
        assert_eq!(total.cents(), 1501);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }

    /// $100.00 split three ways loses a cent when reassembled; the engine
    /// never reassembles shares, it works on exact `paid × n − total` ratios.
    #[test]
    fn test_split_evenly_precision_loss_documented() {
        let total = Money::from_cents(10_000);
        let share = total.split_evenly(3);
        assert_eq!(share.cents(), 3333);

        let reconstructed = share + share + share;
        assert_eq!((total - reconstructed).cents(), 1);
    }

    #[test]
    fn test_to_decimal() {
        assert!((Money::from_cents(15050).to_decimal() - 150.50).abs() < f64::EPSILON);
        assert!((Money::from_cents(-50).to_decimal() + 0.5).abs() < f64::EPSILON);
    }
}
