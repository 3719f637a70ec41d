//! Linear vesting formula.

use crate::domain::{Amount, TimeSecs};
use alloy_primitives::U256;

/// Amount unlocked at `now` for a stream of `cap` vesting linearly over
/// `duration_secs` starting at `last_withdrawal`.
///
/// `min(cap, floor(cap * elapsed / duration))` with `elapsed` clamped to
/// zero when the baseline lies in the future. Zero cap or zero duration
/// yields zero.
pub fn unlocked(
    cap: Amount,
    duration_secs: u64,
    last_withdrawal: TimeSecs,
    now: TimeSecs,
) -> Amount {
    if cap.is_zero() || duration_secs == 0 {
        return Amount::ZERO;
    }

    let elapsed = now.elapsed_since(last_withdrawal);
    if elapsed >= duration_secs {
        return cap;
    }

    // cap = q*d + r, so floor(cap*e/d) = q*e + floor(r*e/d). With e < d both
    // terms stay below cap and r*e < 2^128, so nothing can overflow U256.
    let d = U256::from(duration_secs);
    let e = U256::from(elapsed);
    let q = cap.wei() / d;
    let r = cap.wei() % d;
    Amount::from_wei(q * e + (r * e) / d)
}
