use crate::domain::Amount;
use alloy_primitives::U256;

/// Default snap threshold: 0.001 of one unit (10^15 wei).
pub const DEFAULT_DRIFT_THRESHOLD: Amount =
    Amount::from_wei(U256::from_limbs([1_000_000_000_000_000, 0, 0, 0]));

/// Outcome of comparing the local estimate with a ground-truth read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Drift within threshold; local estimate kept as-is.
    Kept(Amount),
    /// Drift exceeded threshold; local estimate replaced by ground truth.
    Snapped(Amount),
}

impl Reconciliation {
    pub fn value(&self) -> Amount {
        match self {
            Reconciliation::Kept(v) | Reconciliation::Snapped(v) => *v,
        }
    }

    pub fn is_snap(&self) -> bool {
        matches!(self, Reconciliation::Snapped(_))
    }
}

/// Snaps the local estimate to ground truth when they drift too far apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationPolicy {
    threshold: Amount,
}

impl ReconciliationPolicy {
    pub fn new(threshold: Amount) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> Amount {
        self.threshold
    }

    /// Strictly greater than the threshold snaps; equal keeps.
    pub fn reconcile(&self, local: Amount, ground_truth: Amount) -> Reconciliation {
        if ground_truth.abs_diff(local) > self.threshold {
            Reconciliation::Snapped(ground_truth)
        } else {
            Reconciliation::Kept(local)
        }
    }
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_DRIFT_THRESHOLD)
    }
}
