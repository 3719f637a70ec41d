//! Local extrapolation of the unlocked balance between ground-truth reads.

use super::reconcile::{Reconciliation, ReconciliationPolicy};
use crate::domain::{Amount, StreamSnapshot, TimeSecs};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// What produced an estimate change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateSource {
    Tick,
    Snap,
    Reset,
}

/// Pushed to subscribers whenever the local estimate changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EstimateEvent {
    pub estimate: Amount,
    pub at: TimeSecs,
    pub source: EstimateSource,
}

impl EstimateEvent {
    fn initial() -> Self {
        Self {
            estimate: Amount::ZERO,
            at: TimeSecs::default(),
            source: EstimateSource::Reset,
        }
    }
}

/// Owns the current snapshot and the local estimate derived from it.
///
/// Recomputation only happens in [`tick`](Self::tick); snapshot updates just
/// swap the stored value.
#[derive(Debug)]
pub struct InterpolationEngine {
    snapshot: Option<Arc<StreamSnapshot>>,
    estimate: Amount,
    connected: bool,
    events: watch::Sender<EstimateEvent>,
}

impl InterpolationEngine {
    pub fn new() -> Self {
        let (events, _) = watch::channel(EstimateEvent::initial());
        Self {
            snapshot: None,
            estimate: Amount::ZERO,
            connected: false,
            events,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<EstimateEvent> {
        self.events.subscribe()
    }

    pub fn estimate(&self) -> Amount {
        self.estimate
    }

    pub fn snapshot(&self) -> Option<&Arc<StreamSnapshot>> {
        self.snapshot.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Replace the stored snapshot. Does not recompute.
    pub fn on_snapshot_updated(&mut self, snapshot: Option<Arc<StreamSnapshot>>) {
        self.snapshot = snapshot;
    }

    /// Going inactive forces the estimate to zero immediately.
    pub fn set_connected(&mut self, connected: bool, now: TimeSecs) {
        self.connected = connected;
        if !connected {
            self.reset(now);
        }
    }

    /// Re-evaluate the vesting formula at `now`.
    pub fn tick(&mut self, now: TimeSecs) -> Amount {
        let next = match (&self.snapshot, self.connected) {
            (Some(snapshot), true) if snapshot.is_vesting() => snapshot.unlocked_at(now),
            _ => Amount::ZERO,
        };
        self.publish(next, now, EstimateSource::Tick);
        next
    }

    /// Reconcile against a fresh ground-truth read, snapping if needed.
    pub fn apply_ground_truth(
        &mut self,
        ground_truth: Amount,
        policy: &ReconciliationPolicy,
        now: TimeSecs,
    ) -> Reconciliation {
        if !self.connected {
            return Reconciliation::Kept(self.estimate);
        }
        let outcome = policy.reconcile(self.estimate, ground_truth);
        if let Reconciliation::Snapped(value) = outcome {
            info!(
                "Drift above threshold: snapping estimate {} -> {}",
                self.estimate, value
            );
            self.publish(value, now, EstimateSource::Snap);
        }
        outcome
    }

    /// Drop the snapshot and zero the estimate.
    pub fn reset(&mut self, now: TimeSecs) {
        self.snapshot = None;
        self.publish(Amount::ZERO, now, EstimateSource::Reset);
    }

    fn publish(&mut self, estimate: Amount, at: TimeSecs, source: EstimateSource) {
        self.estimate = estimate;
        let changed = self.events.send_if_modified(|event| {
            if event.estimate == estimate {
                return false;
            }
            *event = EstimateEvent {
                estimate,
                at,
                source,
            };
            true
        });
        if changed {
            debug!("Estimate now {} ({:?} at {})", estimate, source, at);
        }
    }
}

impl Default for InterpolationEngine {
    fn default() -> Self {
        Self::new()
    }
}
