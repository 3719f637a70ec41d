use crate::domain::TimeSecs;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

/// Wall-clock source for vesting math.
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> TimeSecs;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> TimeSecs {
        TimeSecs::now()
    }
}

/// Settable clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new(start: TimeSecs) -> Self {
        ManualClock(AtomicI64::new(start.as_secs()))
    }

    pub fn set(&self, now: TimeSecs) {
        self.0.store(now.as_secs(), Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> TimeSecs {
        TimeSecs::new(self.0.load(Ordering::SeqCst))
    }
}
