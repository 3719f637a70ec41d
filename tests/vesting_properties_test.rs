use alloy_primitives::U256;
use std::sync::Arc;
use streamweaver::domain::{Address, Amount, StreamSnapshot, TimeSecs};
use streamweaver::engine::{unlocked, InterpolationEngine, ReconciliationPolicy};

const T0: i64 = 1_700_000_000;

fn reference(cap: U256, duration: u64, elapsed: u64) -> U256 {
    let e = U256::from(elapsed.min(duration));
    cap * e / U256::from(duration)
}

#[test]
fn test_matches_reference_for_small_caps() {
    let caps = [1u64, 7, 999, 1_000_000_007, u64::MAX];
    let durations = [1u64, 3, 60, 86_400, 31_536_000];
    for &cap in &caps {
        for &duration in &durations {
            for elapsed in [0, 1, duration / 3, duration / 2, duration - 1, duration, duration * 2] {
                let got = unlocked(
                    Amount::from_wei(U256::from(cap)),
                    duration,
                    TimeSecs::new(T0),
                    TimeSecs::new(T0 + elapsed as i64),
                );
                assert_eq!(
                    got.wei(),
                    reference(U256::from(cap), duration, elapsed),
                    "cap={} duration={} elapsed={}",
                    cap,
                    duration,
                    elapsed
                );
            }
        }
    }
}

#[test]
fn test_never_exceeds_cap_and_never_decreases() {
    let cap = Amount::parse_units("12345.678901234567890").unwrap();
    let duration = 7 * 86_400;
    let mut previous = Amount::ZERO;
    for step in 0..=200 {
        let now = TimeSecs::new(T0 + step * 4_000);
        let value = unlocked(cap, duration, TimeSecs::new(T0), now);
        assert!(value <= cap);
        assert!(value >= previous);
        previous = value;
    }
    assert_eq!(previous, cap);
}

#[test]
fn test_max_cap_does_not_overflow() {
    let cap = Amount::from_wei(U256::MAX);
    let half = unlocked(cap, 2, TimeSecs::new(T0), TimeSecs::new(T0 + 1));
    assert_eq!(half.wei(), U256::MAX / U256::from(2u8));
    assert_eq!(unlocked(cap, 2, TimeSecs::new(T0), TimeSecs::new(T0 + 2)), cap);
}

#[test]
fn test_engine_converges_after_reconciliation() {
    let mut engine = InterpolationEngine::new();
    let policy = ReconciliationPolicy::default();
    engine.set_connected(true, TimeSecs::new(T0));
    engine.on_snapshot_updated(Some(Arc::new(StreamSnapshot::new(
        Amount::from_units(100),
        100,
        TimeSecs::new(T0),
        Address::ZERO,
    ))));

    engine.tick(TimeSecs::new(T0 + 10));
    assert_eq!(engine.estimate(), Amount::from_units(10));

    let outcome = engine.apply_ground_truth(Amount::from_units(12), &policy, TimeSecs::new(T0 + 10));
    assert!(outcome.is_snap());
    assert_eq!(engine.estimate(), Amount::from_units(12));

    // The next tick is formula-driven again.
    engine.tick(TimeSecs::new(T0 + 20));
    assert_eq!(engine.estimate(), Amount::from_units(20));
}
