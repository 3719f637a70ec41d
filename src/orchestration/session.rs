//! One connected view: shared state plus the periodic tasks that drive it.

use super::clock::Clock;
use crate::config::SessionConfig;
use crate::datasource::{ChainDataSource, DataSourceError};
use crate::domain::{Address, Amount, StreamSnapshot, TimeSecs};
use crate::engine::{
    EstimateEvent, InterpolationEngine, Reconciliation, ReconciliationPolicy, StreamDetails,
};
use crate::presentation::{DisplayState, PresentationFormatter};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Snapshot of what the balance view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    pub address: Address,
    pub estimate_wei: Amount,
    #[serde(flatten)]
    pub display: DisplayState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ground_truth_wei: Option<Amount>,
    /// No stream snapshot has arrived yet.
    pub loading: bool,
    /// The latest read of some source failed; last good values are shown.
    pub stale: bool,
}

/// Stream details plus the state of the read behind them.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamView {
    #[serde(flatten)]
    pub details: StreamDetails,
    /// No details read has succeeded yet; `hasStream` is not meaningful.
    pub loading: bool,
    /// The latest details read failed; the last good details are shown.
    pub stale: bool,
}

/// State shared by a session's tasks. Never locked across an await.
#[derive(Debug)]
pub struct SessionCore {
    address: Address,
    engine: InterpolationEngine,
    policy: ReconciliationPolicy,
    ground_truth: Option<Amount>,
    details_snapshot: Option<Arc<StreamSnapshot>>,
    stream_stale: bool,
    balance_stale: bool,
    details_stale: bool,
    display: DisplayState,
    display_decimals: usize,
}

impl SessionCore {
    pub fn new(address: Address, config: &SessionConfig, now: TimeSecs) -> Self {
        let mut engine = InterpolationEngine::new();
        engine.set_connected(true, now);
        Self {
            address,
            engine,
            policy: ReconciliationPolicy::new(config.drift_threshold),
            ground_truth: None,
            details_snapshot: None,
            stream_stale: false,
            balance_stale: false,
            details_stale: false,
            display: DisplayState::zero(config.display_decimals),
            display_decimals: config.display_decimals,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn estimate(&self) -> Amount {
        self.engine.estimate()
    }

    pub fn ground_truth(&self) -> Option<Amount> {
        self.ground_truth
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn is_active(&self) -> bool {
        self.engine.is_connected()
    }

    pub fn subscribe(&self) -> watch::Receiver<EstimateEvent> {
        self.engine.subscribe()
    }

    /// Apply a stream-parameter read. Returns true when this was the first
    /// snapshot of the session.
    pub fn on_stream_read(&mut self, result: Result<StreamSnapshot, DataSourceError>) -> bool {
        match result {
            Ok(snapshot) => {
                let first = self.engine.snapshot().is_none();
                self.stream_stale = false;
                self.engine.on_snapshot_updated(Some(Arc::new(snapshot)));
                first
            }
            Err(e) => {
                warn!("Stream read failed for {}: {}; keeping last snapshot", self.address, e);
                self.stream_stale = true;
                false
            }
        }
    }

    /// Apply a ground-truth read and reconcile against it.
    pub fn on_balance_read(
        &mut self,
        result: Result<Amount, DataSourceError>,
        now: TimeSecs,
    ) -> Option<Reconciliation> {
        match result {
            Ok(balance) => {
                self.balance_stale = false;
                self.ground_truth = Some(balance);
                Some(self.engine.apply_ground_truth(balance, &self.policy, now))
            }
            Err(e) => {
                warn!("Balance read failed for {}: {}; keeping last value", self.address, e);
                self.balance_stale = true;
                None
            }
        }
    }

    pub fn on_details_read(&mut self, result: Result<StreamSnapshot, DataSourceError>) {
        match result {
            Ok(snapshot) => {
                self.details_stale = false;
                self.details_snapshot = Some(Arc::new(snapshot));
            }
            Err(e) => {
                warn!("Details read failed for {}: {}; keeping last details", self.address, e);
                self.details_stale = true;
            }
        }
    }

    pub fn tick(&mut self, now: TimeSecs) -> Amount {
        self.engine.tick(now)
    }

    pub fn set_display(&mut self, display: DisplayState) {
        self.display = display;
    }

    pub fn details(&self, now: TimeSecs) -> StreamView {
        StreamView {
            details: StreamDetails::from_snapshot(self.details_snapshot.as_deref(), now),
            loading: self.details_snapshot.is_none(),
            stale: self.details_stale,
        }
    }

    pub fn view(&self) -> BalanceView {
        BalanceView {
            address: self.address,
            estimate_wei: self.engine.estimate(),
            display: self.display.clone(),
            ground_truth_wei: self.ground_truth,
            loading: self.engine.snapshot().is_none(),
            stale: self.stream_stale || self.balance_stale,
        }
    }

    /// Clear everything the session learned and zero the display.
    pub fn teardown(&mut self, now: TimeSecs) {
        self.engine.set_connected(false, now);
        self.ground_truth = None;
        self.details_snapshot = None;
        self.stream_stale = false;
        self.balance_stale = false;
        self.details_stale = false;
        self.display = DisplayState::zero(self.display_decimals);
    }
}

pub type SharedCore = Arc<Mutex<SessionCore>>;

fn lock(core: &Mutex<SessionCore>) -> MutexGuard<'_, SessionCore> {
    core.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A running session: shared core plus its periodic tasks.
#[derive(Debug)]
pub struct Session {
    address: Address,
    core: SharedCore,
    clock: Arc<dyn Clock>,
    tasks: Vec<JoinHandle<()>>,
}

impl Session {
    /// Start polling, ticking and presenting for `address`.
    pub fn start(
        address: Address,
        datasource: Arc<dyn ChainDataSource>,
        clock: Arc<dyn Clock>,
        config: &SessionConfig,
    ) -> Self {
        let core = Arc::new(Mutex::new(SessionCore::new(address, config, clock.now())));
        let events = lock(&core).subscribe();
        let (ready_tx, ready_rx) = watch::channel(false);

        let tasks = vec![
            tokio::spawn(poll_stream(
                config.stream_poll,
                datasource.clone(),
                address,
                core.clone(),
                ready_tx,
            )),
            tokio::spawn(poll_balance(
                config.balance_poll,
                datasource.clone(),
                address,
                core.clone(),
                clock.clone(),
            )),
            tokio::spawn(poll_details(
                config.details_poll,
                datasource,
                address,
                core.clone(),
            )),
            tokio::spawn(tick_loop(config.tick, ready_rx, core.clone(), clock.clone())),
            tokio::spawn(present_loop(
                events,
                core.clone(),
                PresentationFormatter::new(config.display_decimals, config.pulse),
            )),
        ];

        info!("Session started for {}", address);

        Self {
            address,
            core,
            clock,
            tasks,
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn core(&self) -> SharedCore {
        self.core.clone()
    }

    pub fn view(&self) -> BalanceView {
        lock(&self.core).view()
    }

    pub fn details(&self) -> StreamView {
        lock(&self.core).details(self.clock.now())
    }

    pub fn estimate(&self) -> Amount {
        lock(&self.core).estimate()
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Abort every task, wait for them to finish, then zero the state.
    /// Returns the core so callers can observe the final state.
    pub async fn shutdown(self) -> SharedCore {
        for task in &self.tasks {
            task.abort();
        }
        for task in self.tasks {
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    warn!("Session task for {} ended abnormally: {}", self.address, e);
                }
            }
        }
        lock(&self.core).teardown(self.clock.now());
        info!("Session stopped for {}", self.address);
        self.core
    }
}

/// Slow-cadence interval. Each read completes before the next tick is
/// awaited, so at most one read per source is in flight; late ticks are
/// delayed rather than bursted.
fn poll_interval(period: Duration) -> Interval {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

async fn poll_stream(
    period: Duration,
    datasource: Arc<dyn ChainDataSource>,
    address: Address,
    core: SharedCore,
    ready: watch::Sender<bool>,
) {
    let mut interval = poll_interval(period);
    loop {
        interval.tick().await;
        let result = datasource.fetch_stream(&address).await;
        let first = lock(&core).on_stream_read(result);
        if first {
            debug!("First snapshot for {}; ticking can start", address);
            ready.send_replace(true);
        }
    }
}

async fn poll_balance(
    period: Duration,
    datasource: Arc<dyn ChainDataSource>,
    address: Address,
    core: SharedCore,
    clock: Arc<dyn Clock>,
) {
    let mut interval = poll_interval(period);
    loop {
        interval.tick().await;
        let result = datasource.fetch_unlocked_balance(&address).await;
        lock(&core).on_balance_read(result, clock.now());
    }
}

async fn poll_details(
    period: Duration,
    datasource: Arc<dyn ChainDataSource>,
    address: Address,
    core: SharedCore,
) {
    let mut interval = poll_interval(period);
    loop {
        interval.tick().await;
        let result = datasource.fetch_stream(&address).await;
        lock(&core).on_details_read(result);
    }
}

async fn tick_loop(
    period: Duration,
    mut ready: watch::Receiver<bool>,
    core: SharedCore,
    clock: Arc<dyn Clock>,
) {
    let started = ready.wait_for(|ready| *ready).await.is_ok();
    if !started {
        return;
    }
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        interval.tick().await;
        lock(&core).tick(clock.now());
    }
}

async fn present_loop(
    mut events: watch::Receiver<EstimateEvent>,
    core: SharedCore,
    mut formatter: PresentationFormatter,
) {
    loop {
        let deadline = formatter.pulse_deadline();
        tokio::select! {
            changed = events.changed() => {
                if changed.is_err() {
                    return;
                }
                let event = *events.borrow_and_update();
                let state = formatter.observe(event.estimate, Instant::now());
                lock(&core).set_display(state);
            }
            _ = pulse_expiry(deadline) => {
                let now = Instant::now();
                if formatter.expire(now) {
                    lock(&core).set_display(formatter.state(now));
                }
            }
        }
    }
}

async fn pulse_expiry(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
