//! Pure computation for the vesting-balance view: the vesting formula, the
//! interpolation engine, drift reconciliation and derived stream details.

pub mod details;
pub mod interpolation;
pub mod reconcile;
pub mod vesting;

pub use details::{AssetKind, StreamDetails};
pub use interpolation::{EstimateEvent, EstimateSource, InterpolationEngine};
pub use reconcile::{Reconciliation, ReconciliationPolicy, DEFAULT_DRIFT_THRESHOLD};
pub use vesting::unlocked;
