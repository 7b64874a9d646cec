//! Money amounts in minor currency units
//!
//! Balances are carried as whole cents so the month-over-month roll-forward
//! is exact. The only floating point step is the level payment formula, whose
//! result is rounded back to cents immediately.

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, Sub};
use std::str::FromStr;

/// Monetary amount in cents (1.23 is stored as 123)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Round a real-valued cent amount to the nearest cent (half away from zero).
    ///
    /// Returns `None` when the rounded value is not finite or does not fit in
    /// an `i64`, instead of letting the cast saturate.
    pub fn from_f64_cents(cents: f64) -> Option<Self> {
        let rounded = cents.round();
        // i64::MAX as f64 rounds up to 2^63, which is itself out of range
        if rounded.is_finite() && rounded >= i64::MIN as f64 && rounded < i64::MAX as f64 {
            Some(Money(rounded as i64))
        } else {
            None
        }
    }

    pub fn as_f64_cents(self) -> f64 {
        self.0 as f64
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub fn checked_add(self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.copied().sum()
    }
}

/// Fixed two-decimal rendering: 1234 -> "12.34", -5 -> "-0.05"
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{}{}.{:02}", sign, abs / 100, abs % 100)
    }
}

/// Error returned when parsing a two-decimal amount string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid money amount: {0:?}")]
pub struct ParseMoneyError(String);

impl FromStr for Money {
    type Err = ParseMoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMoneyError(s.to_string());
        let trimmed = s.trim();
        let (negative, digits) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };

        let (units, fraction) = match digits.split_once('.') {
            Some((u, f)) => (u, f),
            None => (digits, ""),
        };
        if units.is_empty() || fraction.len() > 2 {
            return Err(err());
        }
        if !units.bytes().all(|b| b.is_ascii_digit()) || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let units: i64 = units.parse().map_err(|_| err())?;
        let fraction: i64 = match fraction.len() {
            0 => 0,
            1 => fraction.parse::<i64>().map_err(|_| err())? * 10,
            _ => fraction.parse().map_err(|_| err())?,
        };

        let cents = units
            .checked_mul(100)
            .and_then(|c| c.checked_add(fraction))
            .ok_or_else(err)?;
        Ok(Money(if negative { -cents } else { cents }))
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct MoneyVisitor;

impl<'de> Visitor<'de> for MoneyVisitor {
    type Value = Money;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a two-decimal amount string such as \"12.34\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Money, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(MoneyVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_two_decimals() {
        assert_eq!(Money::from_cents(1234).to_string(), "12.34");
        assert_eq!(Money::ZERO.to_string(), "0.00");
        assert_eq!(Money::from_cents(7).to_string(), "0.07");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
        assert_eq!(Money::from_cents(21936).to_string(), "219.36");
    }

    #[test]
    fn test_serialize_as_string() {
        let json = serde_json::to_string(&Money::from_cents(1234)).unwrap();
        assert_eq!(json, "\"12.34\"");

        let json = serde_json::to_string(&Money::ZERO).unwrap();
        assert_eq!(json, "\"0.00\"");
    }

    #[test]
    fn test_parse() {
        assert_eq!("12.34".parse::<Money>().unwrap(), Money::from_cents(1234));
        assert_eq!("12.3".parse::<Money>().unwrap(), Money::from_cents(1230));
        assert_eq!("12".parse::<Money>().unwrap(), Money::from_cents(1200));
        assert_eq!("-0.05".parse::<Money>().unwrap(), Money::from_cents(-5));
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".50".parse::<Money>().is_err());
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(Money::from_f64_cents(2083.5), Some(Money::from_cents(2084)));
        assert_eq!(Money::from_f64_cents(2083.49), Some(Money::from_cents(2083)));
        assert_eq!(Money::from_f64_cents(-0.5), Some(Money::from_cents(-1)));
    }

    #[test]
    fn test_from_f64_out_of_range() {
        assert_eq!(Money::from_f64_cents(9.375e18), None);
        assert_eq!(Money::from_f64_cents(i64::MAX as f64), None);
        assert_eq!(Money::from_f64_cents(-1e19), None);
        assert_eq!(Money::from_f64_cents(f64::NAN), None);
        assert_eq!(Money::from_f64_cents(f64::INFINITY), None);
        assert_eq!(Money::from_f64_cents(9.0e18), Some(Money::from_cents(9_000_000_000_000_000_000)));
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_cents(150);
        let b = Money::from_cents(50);
        assert_eq!(a + b, Money::from_cents(200));
        assert_eq!(a - b, Money::from_cents(100));
        assert_eq!(a.checked_add(b), Some(Money::from_cents(200)));
        assert_eq!(Money::from_cents(i64::MAX).checked_add(b), None);
        assert_eq!(Money::from_cents(i64::MIN).checked_sub(b), None);

        let total: Money = [a, b, a].iter().sum();
        assert_eq!(total, Money::from_cents(350));
    }
}
