//! Display formatting and the one-shot "increasing" pulse.

use crate::domain::{Amount, DECIMALS};
use serde::Serialize;
use std::time::Duration;
use tokio::time::Instant;

pub const DEFAULT_DISPLAY_DECIMALS: usize = 8;
pub const DEFAULT_PULSE: Duration = Duration::from_millis(200);

/// Format `amount` with exactly `decimals` fraction digits, truncating.
pub fn format_amount(amount: Amount, decimals: usize) -> String {
    let (whole, fraction) = split_display(amount, decimals);
    if fraction.is_empty() {
        whole
    } else {
        format!("{}.{}", whole, fraction)
    }
}

fn split_display(amount: Amount, decimals: usize) -> (String, String) {
    let (whole, fraction) = amount.split_units();
    let shown = decimals.min(DECIMALS);
    (whole, fraction[..shown].to_string())
}

/// What the UI renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    pub text: String,
    pub whole: String,
    pub fraction: String,
    /// Displayed (truncated) value.
    pub value: Amount,
    pub increasing: bool,
}

impl DisplayState {
    pub fn zero(decimals: usize) -> Self {
        let (whole, fraction) = split_display(Amount::ZERO, decimals);
        Self {
            text: format_amount(Amount::ZERO, decimals),
            whole,
            fraction,
            value: Amount::ZERO,
            increasing: false,
        }
    }
}

/// Turns estimates into display text and tracks the increase pulse.
///
/// Keeps its own previous displayed value; the pulse is armed only when the
/// displayed value strictly increases and expires on its own deadline.
#[derive(Debug, Clone)]
pub struct PresentationFormatter {
    decimals: usize,
    pulse: Duration,
    previous: Amount,
    pulse_until: Option<Instant>,
}

impl PresentationFormatter {
    pub fn new(decimals: usize, pulse: Duration) -> Self {
        Self {
            decimals: decimals.min(DECIMALS),
            pulse,
            previous: Amount::ZERO,
            pulse_until: None,
        }
    }

    pub fn decimals(&self) -> usize {
        self.decimals
    }

    /// Feed a new estimate observed at `now`.
    pub fn observe(&mut self, amount: Amount, now: Instant) -> DisplayState {
        let shown = amount.truncate_to(self.decimals);
        if shown > self.previous {
            self.pulse_until = Some(now + self.pulse);
        }
        self.previous = shown;
        self.state(now)
    }

    /// When the armed pulse lapses, if any.
    pub fn pulse_deadline(&self) -> Option<Instant> {
        self.pulse_until
    }

    /// Disarm a lapsed pulse. Returns true if it was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.pulse_until {
            Some(deadline) if now >= deadline => {
                self.pulse_until = None;
                true
            }
            _ => false,
        }
    }

    pub fn state(&self, now: Instant) -> DisplayState {
        let (whole, fraction) = split_display(self.previous, self.decimals);
        DisplayState {
            text: format_amount(self.previous, self.decimals),
            whole,
            fraction,
            value: self.previous,
            increasing: self.pulse_until.is_some_and(|deadline| now < deadline),
        }
    }

    pub fn reset(&mut self) {
        self.previous = Amount::ZERO;
        self.pulse_until = None;
    }
}

impl Default for PresentationFormatter {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_DECIMALS, DEFAULT_PULSE)
    }
}
