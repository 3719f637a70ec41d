//! Domain primitives: TimeSecs, Address.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Time in whole seconds since Unix epoch.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TimeSecs(pub i64);

impl TimeSecs {
    /// Create a TimeSecs from seconds.
    pub fn new(secs: i64) -> Self {
        TimeSecs(secs)
    }

    /// Current wall-clock time, floored to the second.
    pub fn now() -> Self {
        TimeSecs(chrono::Utc::now().timestamp())
    }

    /// Get the underlying seconds value.
    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Seconds elapsed from `since` to `self`, clamped to zero when `since`
    /// lies in the future.
    pub fn elapsed_since(&self, since: TimeSecs) -> u64 {
        let delta = i128::from(self.0) - i128::from(since.0);
        if delta <= 0 {
            0
        } else {
            u64::try_from(delta).unwrap_or(u64::MAX)
        }
    }

    /// Convert to a UTC datetime, if representable.
    pub fn to_datetime(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::from_timestamp(self.0, 0)
    }
}

impl std::fmt::Display for TimeSecs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 20-byte account or contract address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub alloy_primitives::Address);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid address: {0}")]
pub struct AddressParseError(pub String);

impl Address {
    /// The all-zero address, reserved for the chain's native asset.
    pub const ZERO: Address = Address(alloy_primitives::Address::ZERO);

    /// Build an address from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Address(alloy_primitives::Address::from(bytes))
    }

    /// True for the native-asset sentinel.
    pub fn is_zero(&self) -> bool {
        self.0 == alloy_primitives::Address::ZERO
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_slice()
    }

    /// Lowercase `0x`-prefixed hex.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0.as_slice()))
    }
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .ok_or_else(|| AddressParseError(s.to_string()))?;
        if digits.len() != 40 {
            return Err(AddressParseError(s.to_string()));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| AddressParseError(s.to_string()))?;
        Ok(Address::from_bytes(bytes))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for Address {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(serde::de::Error::custom)
    }
}
