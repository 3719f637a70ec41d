//! Domain types for the vesting-balance view.
//!
//! This module provides:
//! - Exact fixed-point amounts (18 decimals) via `Amount`
//! - Display-only ratios via the `Decimal` wrapper
//! - Domain primitives: TimeSecs, Address
//! - The immutable `StreamSnapshot` read from the streaming contract

pub mod amount;
pub mod decimal;
pub mod primitives;
pub mod snapshot;

pub use amount::{Amount, AmountParseError, DECIMALS, WEI_PER_UNIT};
pub use decimal::Decimal;
pub use primitives::{Address, AddressParseError, TimeSecs};
pub use snapshot::StreamSnapshot;
