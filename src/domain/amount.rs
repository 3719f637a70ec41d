//! Fixed-point token amounts with 18 implied decimals, backed by U256.
//!
//! All vesting math stays in integer space; conversion to text happens only
//! at the edges (display, API, user input).

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of implied decimal places.
pub const DECIMALS: usize = 18;

/// 10^18, one whole unit in wei.
pub const WEI_PER_UNIT: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Non-negative fixed-point amount in wei.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(U256);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountParseError {
    #[error("empty amount")]
    Empty,
    #[error("invalid amount: {0}")]
    Invalid(String),
    #[error("too many decimal places (max {DECIMALS}): {0}")]
    TooPrecise(String),
    #[error("amount out of range: {0}")]
    Overflow(String),
}

impl Amount {
    pub const ZERO: Amount = Amount(U256::ZERO);

    pub const fn from_wei(wei: U256) -> Self {
        Amount(wei)
    }

    pub fn from_wei_u128(wei: u128) -> Self {
        Amount(U256::from(wei))
    }

    /// Whole units, e.g. `from_units(100)` is 100 * 10^18 wei.
    pub fn from_units(units: u64) -> Self {
        Amount(U256::from(units) * WEI_PER_UNIT)
    }

    pub fn wei(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Absolute difference, never negative.
    pub fn abs_diff(&self, other: Amount) -> Amount {
        if self.0 >= other.0 {
            Amount(self.0 - other.0)
        } else {
            Amount(other.0 - self.0)
        }
    }

    /// Drop every fraction digit past `decimals`.
    pub fn truncate_to(&self, decimals: usize) -> Amount {
        if decimals >= DECIMALS {
            return *self;
        }
        let step = U256::from(10u64).pow(U256::from(DECIMALS - decimals));
        Amount(self.0 - self.0 % step)
    }

    /// Parse a decimal unit string ("1.5", "0.001", "42") into wei.
    pub fn parse_units(s: &str) -> Result<Self, AmountParseError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AmountParseError::Empty);
        }
        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, f),
            None => (s, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(AmountParseError::Invalid(s.to_string()));
        }
        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(fraction) {
            return Err(AmountParseError::Invalid(s.to_string()));
        }
        if fraction.len() > DECIMALS {
            return Err(AmountParseError::TooPrecise(s.to_string()));
        }

        let whole_wei = if whole.is_empty() {
            U256::ZERO
        } else {
            U256::from_str_radix(whole, 10)
                .map_err(|_| AmountParseError::Overflow(s.to_string()))?
                .checked_mul(WEI_PER_UNIT)
                .ok_or_else(|| AmountParseError::Overflow(s.to_string()))?
        };
        let fraction_wei = if fraction.is_empty() {
            U256::ZERO
        } else {
            let padded = format!("{:0<width$}", fraction, width = DECIMALS);
            U256::from_str_radix(&padded, 10)
                .map_err(|_| AmountParseError::Invalid(s.to_string()))?
        };

        whole_wei
            .checked_add(fraction_wei)
            .map(Amount)
            .ok_or_else(|| AmountParseError::Overflow(s.to_string()))
    }

    /// Split into the whole-unit part and the 18-digit zero-padded fraction.
    pub fn split_units(&self) -> (String, String) {
        let whole = self.0 / WEI_PER_UNIT;
        let fraction = self.0 % WEI_PER_UNIT;
        (
            whole.to_string(),
            format!("{:0>width$}", fraction.to_string(), width = DECIMALS),
        )
    }

    /// Full-precision unit string with trailing zeros removed ("1.5", "0").
    pub fn format_units(&self) -> String {
        let (whole, fraction) = self.split_units();
        let fraction = fraction.trim_end_matches('0');
        if fraction.is_empty() {
            whole
        } else {
            format!("{}.{}", whole, fraction)
        }
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_units())
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Amount(value)
    }
}

impl From<Amount> for U256 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl FromStr for Amount {
    type Err = AmountParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_units(s)
    }
}

// Serialized as a decimal wei string so no precision is lost in JSON.
impl Serialize for Amount {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        U256::from_str_radix(&s, 10)
            .map(Amount)
            .map_err(serde::de::Error::custom)
    }
}
