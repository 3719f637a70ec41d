use crate::domain::{Address, Amount, Decimal, StreamSnapshot, TimeSecs};
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const SECONDS_PER_DAY: u64 = 86_400;

/// Native asset vs. token stream, for badge labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Native,
    Token,
}

/// Display-oriented view of a stream snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamDetails {
    pub has_stream: bool,
    pub cap: Amount,
    pub formatted_cap: String,
    pub unlock_duration_secs: u64,
    pub duration_days: Decimal,
    pub progress_percent: Decimal,
    pub token: Address,
    pub is_native_asset: bool,
    pub asset_kind: AssetKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl StreamDetails {
    /// "No active stream": what an absent snapshot reports.
    pub fn none() -> Self {
        Self::derive(&StreamSnapshot::empty(), TimeSecs::default())
    }

    /// Derive from an optional snapshot, tolerating absence.
    pub fn from_snapshot(snapshot: Option<&StreamSnapshot>, now: TimeSecs) -> Self {
        match snapshot {
            Some(snapshot) => Self::derive(snapshot, now),
            None => Self::none(),
        }
    }

    pub fn derive(snapshot: &StreamSnapshot, now: TimeSecs) -> Self {
        let has_stream = snapshot.has_stream();
        let duration = snapshot.unlock_duration_secs;

        let progress_percent = if snapshot.is_vesting() {
            (Decimal::ratio(snapshot.elapsed_at(now), duration) * Decimal::hundred())
                .min(Decimal::hundred())
                .round_dp(4)
        } else {
            Decimal::zero()
        };

        let asset_kind = if snapshot.is_native_asset() {
            AssetKind::Native
        } else {
            AssetKind::Token
        };

        let (start_time, end_time) = if has_stream {
            (
                snapshot.last_withdrawal.to_datetime(),
                snapshot.end_time().to_datetime(),
            )
        } else {
            (None, None)
        };

        Self {
            has_stream,
            cap: snapshot.cap,
            formatted_cap: snapshot.cap.format_units(),
            unlock_duration_secs: duration,
            duration_days: Decimal::ratio(duration, SECONDS_PER_DAY),
            progress_percent,
            token: snapshot.token,
            is_native_asset: snapshot.is_native_asset(),
            asset_kind,
            start_time,
            end_time,
        }
    }
}
