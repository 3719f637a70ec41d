//! Display-only decimal ratios backed by rust_decimal.
//!
//! Used for progress percentages and day counts. Never used for balances,
//! which live in [`crate::domain::Amount`].

use rust_decimal::Decimal as RustDecimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Decimal ratio for presentation.
///
/// Serializes to a JSON number.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Decimal(#[serde(with = "rust_decimal::serde::float")] RustDecimal);

impl Decimal {
    /// Parse a Decimal from a string losslessly.
    pub fn from_str_canonical(s: &str) -> Result<Self, rust_decimal::Error> {
        RustDecimal::from_str(s).map(Decimal)
    }

    /// `numerator / denominator`, or zero when the denominator is zero.
    pub fn ratio(numerator: u64, denominator: u64) -> Self {
        if denominator == 0 {
            return Self::zero();
        }
        Decimal(RustDecimal::from(numerator) / RustDecimal::from(denominator))
    }

    /// Round half-away-from-zero to `dp` decimal places.
    pub fn round_dp(&self, dp: u32) -> Self {
        Decimal(self.0.round_dp(dp))
    }

    /// Format without exponent notation or trailing zeros.
    pub fn to_canonical_string(&self) -> String {
        format!("{}", self.0.normalize())
    }

    pub fn zero() -> Self {
        Decimal(RustDecimal::ZERO)
    }

    pub fn hundred() -> Self {
        Decimal(RustDecimal::ONE_HUNDRED)
    }

    pub fn min(self, other: Decimal) -> Decimal {
        if self <= other {
            self
        } else {
            other
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_canonical_string())
    }
}

impl std::ops::Mul for Decimal {
    type Output = Decimal;

    fn mul(self, rhs: Decimal) -> Decimal {
        Decimal(self.0 * rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_ratio() {
        assert_eq!(Decimal::ratio(1, 4), d("0.25"));
        assert_eq!(Decimal::ratio(259_200, 86_400), d("3"));
    }

    #[test]
    fn test_ratio_zero_denominator() {
        assert_eq!(Decimal::ratio(10, 0), Decimal::zero());
    }

    #[test]
    fn test_round_dp() {
        assert_eq!(Decimal::ratio(1, 3).round_dp(4), d("0.3333"));
        assert_eq!(Decimal::ratio(2, 3).round_dp(4), d("0.6667"));
    }

    #[test]
    fn test_canonical_string_strips_trailing_zeros() {
        assert_eq!(d("12.5000").to_canonical_string(), "12.5");
        assert_eq!(d("100").to_canonical_string(), "100");
    }

    #[test]
    fn test_min() {
        assert_eq!(d("101").min(Decimal::hundred()), Decimal::hundred());
        assert_eq!(d("3").min(Decimal::hundred()), d("3"));
    }

    #[test]
    fn test_serializes_as_number() {
        let json = serde_json::to_string(&d("12.5")).unwrap();
        assert_eq!(json, "12.5");
    }
}
