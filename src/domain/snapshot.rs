//! Stream-parameter snapshot as read from the streaming contract.

use super::{Address, Amount, TimeSecs};
use crate::engine::vesting;
use serde::Serialize;

/// One `streams(address)` read. Immutable; replaced wholesale on every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamSnapshot {
    /// Maximum total vestable amount.
    pub cap: Amount,
    pub unlock_duration_secs: u64,
    /// Vesting baseline; interpolation starts here.
    pub last_withdrawal: TimeSecs,
    /// `Address::ZERO` for the native asset.
    pub token: Address,
}

impl StreamSnapshot {
    pub fn new(
        cap: Amount,
        unlock_duration_secs: u64,
        last_withdrawal: TimeSecs,
        token: Address,
    ) -> Self {
        Self {
            cap,
            unlock_duration_secs,
            last_withdrawal,
            token,
        }
    }

    /// An all-zero record, which is what the contract returns for an
    /// address without a stream.
    pub fn empty() -> Self {
        Self::new(Amount::ZERO, 0, TimeSecs::new(0), Address::ZERO)
    }

    pub fn has_stream(&self) -> bool {
        !self.cap.is_zero()
    }

    /// A stream that can actually vest. A zero duration counts as no stream.
    pub fn is_vesting(&self) -> bool {
        self.has_stream() && self.unlock_duration_secs > 0
    }

    pub fn is_native_asset(&self) -> bool {
        self.token.is_zero()
    }

    /// Amount unlocked at `now`.
    pub fn unlocked_at(&self, now: TimeSecs) -> Amount {
        vesting::unlocked(
            self.cap,
            self.unlock_duration_secs,
            self.last_withdrawal,
            now,
        )
    }

    /// Seconds since the baseline, clamped to `[0, duration]`.
    pub fn elapsed_at(&self, now: TimeSecs) -> u64 {
        now.elapsed_since(self.last_withdrawal)
            .min(self.unlock_duration_secs)
    }

    /// Baseline plus duration, saturating.
    pub fn end_time(&self) -> TimeSecs {
        let duration = i64::try_from(self.unlock_duration_secs).unwrap_or(i64::MAX);
        TimeSecs::new(self.last_withdrawal.as_secs().saturating_add(duration))
    }
}
