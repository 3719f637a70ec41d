use std::sync::Arc;
use std::time::Duration;
use streamweaver::config::SessionConfig;
use streamweaver::datasource::MockDataSource;
use streamweaver::orchestration::{ConnectionState, ManualClock, Scheduler, SessionKey};
use streamweaver::{Address, Amount, StreamSnapshot, TimeSecs, WithdrawAmount};
use tokio_test::{assert_err, assert_ok};

const T0: i64 = 1_700_000_000;

fn alice() -> Address {
    Address::from_bytes([0xaa; 20])
}

fn bob() -> Address {
    Address::from_bytes([0xbb; 20])
}

fn day_stream(units: u64) -> StreamSnapshot {
    StreamSnapshot::new(Amount::from_units(units), 86_400, TimeSecs::new(T0), Address::ZERO)
}

struct Harness {
    scheduler: Scheduler,
    datasource: Arc<MockDataSource>,
    clock: Arc<ManualClock>,
}

fn harness() -> Harness {
    harness_with(SessionConfig::default())
}

fn harness_with(config: SessionConfig) -> Harness {
    let datasource = Arc::new(
        MockDataSource::new()
            .with_stream(alice(), day_stream(100))
            .with_balance(alice(), Amount::from_units(50))
            .with_stream(bob(), day_stream(200))
            .with_balance(bob(), Amount::from_units(100)),
    );
    let clock = Arc::new(ManualClock::new(TimeSecs::new(T0 + 43_200)));
    let scheduler = Scheduler::new(datasource.clone(), clock.clone(), config);
    Harness {
        scheduler,
        datasource,
        clock,
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(250)).await;
}

#[tokio::test(start_paused = true)]
async fn test_connect_runs_session() {
    let mut h = harness();
    let key = assert_ok!(h.scheduler.connect(alice()).await);
    assert_eq!(key, SessionKey::connected(alice()));
    settle().await;

    let view = assert_ok!(h.scheduler.balance());
    assert_eq!(view.estimate_wei, Amount::from_units(50));
    assert_eq!(view.display.text, "50.00000000");
    assert!(!view.loading);
    assert!(h.datasource.stream_reads() >= 1);
    assert!(h.datasource.balance_reads() >= 1);
}

#[tokio::test(start_paused = true)]
async fn test_estimate_advances_with_clock() {
    let mut h = harness();
    assert_ok!(h.scheduler.connect(alice()).await);
    settle().await;

    // A quarter day later: 75 of 100 unlocked.
    h.clock.advance(21_600);
    h.datasource.set_balance(alice(), Amount::from_units(75));
    tokio::time::sleep(Duration::from_millis(150)).await;

    let view = assert_ok!(h.scheduler.balance());
    assert_eq!(view.estimate_wei, Amount::from_units(75));
    assert_eq!(view.display.text, "75.00000000");
    assert!(view.display.increasing);

    // The pulse clears once its deadline passes without another increase.
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!assert_ok!(h.scheduler.balance()).display.increasing);
}

#[tokio::test(start_paused = true)]
async fn test_disconnect_zeroes_and_stops_reads() {
    let mut h = harness();
    assert_ok!(h.scheduler.connect(alice()).await);
    settle().await;

    let (key, core) = h.scheduler.disconnect().await;
    assert_eq!(key, SessionKey::disconnected());
    assert_eq!(h.scheduler.state(), ConnectionState::Disconnected);

    let core = core.expect("session core");
    let view = core.lock().unwrap().view();
    assert_eq!(view.estimate_wei, Amount::ZERO);
    assert_eq!(view.display.text, "0.00000000");
    assert_eq!(view.ground_truth_wei, None);

    let stream_reads = h.datasource.stream_reads();
    let balance_reads = h.datasource.balance_reads();
    h.clock.advance(3_600);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.datasource.stream_reads(), stream_reads);
    assert_eq!(h.datasource.balance_reads(), balance_reads);
    assert_eq!(core.lock().unwrap().estimate(), Amount::ZERO);

    assert_err!(h.scheduler.balance());
}

#[tokio::test(start_paused = true)]
async fn test_reconnect_same_address_is_noop() {
    let mut h = harness();
    assert_ok!(h.scheduler.connect(alice()).await);
    settle().await;
    let reads = h.datasource.stream_reads();

    assert_ok!(h.scheduler.connect(alice()).await);
    assert_eq!(h.datasource.stream_reads(), reads);
    assert_eq!(
        assert_ok!(h.scheduler.balance()).estimate_wei,
        Amount::from_units(50)
    );
}

#[tokio::test(start_paused = true)]
async fn test_address_change_rebuilds_session() {
    let mut h = harness();
    assert_ok!(h.scheduler.connect(alice()).await);
    settle().await;

    let key = assert_ok!(h.scheduler.connect(bob()).await);
    assert_eq!(key, SessionKey::connected(bob()));
    settle().await;

    let view = assert_ok!(h.scheduler.balance());
    assert_eq!(view.address, bob());
    assert_eq!(view.estimate_wei, Amount::from_units(100));
}

#[tokio::test(start_paused = true)]
async fn test_apply_follows_key() {
    let mut h = harness();
    assert_eq!(
        assert_ok!(h.scheduler.apply(Some(alice())).await),
        SessionKey::connected(alice())
    );
    assert_eq!(
        assert_ok!(h.scheduler.apply(None).await),
        SessionKey::disconnected()
    );
    assert!(h.scheduler.session().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_read_failures_keep_last_values() {
    let mut h = harness();
    assert_ok!(h.scheduler.connect(alice()).await);
    settle().await;

    h.datasource.set_failing_reads(true);
    tokio::time::sleep(Duration::from_secs(6)).await;

    let view = assert_ok!(h.scheduler.balance());
    assert!(view.stale);
    assert_eq!(view.ground_truth_wei, Some(Amount::from_units(50)));
    assert_eq!(view.estimate_wei, Amount::from_units(50));
    let details = assert_ok!(h.scheduler.details());
    assert!(details.stale);
    assert!(details.details.has_stream);

    h.datasource.set_failing_reads(false);
    tokio::time::sleep(Duration::from_secs(6)).await;
    assert!(!assert_ok!(h.scheduler.balance()).stale);
}

#[tokio::test(start_paused = true)]
async fn test_ground_truth_reported_beside_estimate() {
    let mut h = harness();
    // The contract reports less than the formula.
    h.datasource.set_balance(alice(), Amount::from_units(40));
    assert_ok!(h.scheduler.connect(alice()).await);
    tokio::time::sleep(Duration::from_millis(10)).await;

    let view = assert_ok!(h.scheduler.balance());
    assert_eq!(view.ground_truth_wei, Some(Amount::from_units(40)));
}

#[tokio::test(start_paused = true)]
async fn test_drift_snap_reaches_display_until_next_tick() {
    // Ticks at 0s and 9s; balance polls every 2s.
    let mut h = harness_with(SessionConfig {
        tick: Duration::from_secs(9),
        ..SessionConfig::default()
    });
    h.datasource.set_balance(alice(), Amount::from_units(40));
    assert_ok!(h.scheduler.connect(alice()).await);

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    let view = assert_ok!(h.scheduler.balance());
    assert_eq!(view.estimate_wei, Amount::from_units(40));
    assert_eq!(view.display.text, "40.00000000");
    assert_eq!(view.display.value, Amount::from_units(40));
    assert!(!view.display.increasing);

    // The 9s tick recomputes from the formula.
    tokio::time::sleep(Duration::from_millis(6_600)).await;
    let view = assert_ok!(h.scheduler.balance());
    assert_eq!(view.estimate_wei, Amount::from_units(50));
    assert_eq!(view.display.text, "50.00000000");
    assert!(view.display.increasing);
}

#[tokio::test(start_paused = true)]
async fn test_account_without_stream_shows_zero() {
    let mut h = harness();
    let carol = Address::from_bytes([0xcc; 20]);
    assert_ok!(h.scheduler.connect(carol).await);
    settle().await;

    let view = assert_ok!(h.scheduler.balance());
    assert_eq!(view.estimate_wei, Amount::ZERO);
    assert_eq!(view.display.text, "0.00000000");
    let details = assert_ok!(h.scheduler.details());
    assert!(!details.loading);
    assert!(!details.details.has_stream);
}

#[tokio::test(start_paused = true)]
async fn test_withdraw_max_submits_estimate() {
    let mut h = harness();
    assert_ok!(h.scheduler.connect(alice()).await);
    settle().await;

    assert_ok!(h.scheduler.withdraw(WithdrawAmount::Max).await);
    assert_eq!(
        h.datasource.withdrawals(),
        vec![(alice(), Amount::from_units(50))]
    );
}
