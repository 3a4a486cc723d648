//! Pass throttle
//!
//! NPC passes are triggered by the embedding application (a tick loop, an
//! HTTP hook, a test harness). [`PassClock`] only enforces the minimum
//! spacing between passes; it never reads the wall clock itself, so the
//! caller stays in full control of time.

use serde::{Deserialize, Serialize};

/// Minimum-interval gate between NPC passes
///
/// # Example
/// ```
/// use chemtrade_core_rs::PassClock;
///
/// let mut clock = PassClock::new(10);
/// assert!(clock.try_begin_pass(100)); // First pass always runs
/// assert!(!clock.try_begin_pass(105)); // Too soon
/// assert!(clock.try_begin_pass(110)); // Interval elapsed
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassClock {
    /// Minimum seconds between passes
    min_interval_secs: u64,

    /// Caller-supplied timestamp of the last pass that ran
    last_pass_at: Option<u64>,
}

impl PassClock {
    /// Create a clock with the given minimum interval
    pub fn new(min_interval_secs: u64) -> Self {
        Self {
            min_interval_secs,
            last_pass_at: None,
        }
    }

    /// Minimum seconds between passes
    pub fn min_interval_secs(&self) -> u64 {
        self.min_interval_secs
    }

    /// Timestamp of the last pass that ran, if any
    pub fn last_pass_at(&self) -> Option<u64> {
        self.last_pass_at
    }

    /// Attempt to start a pass at `now_secs`
    ///
    /// Returns `true` and records the timestamp if no pass has run yet or
    /// the minimum interval has elapsed; returns `false` otherwise, leaving
    /// the clock unchanged.
    pub fn try_begin_pass(&mut self, now_secs: u64) -> bool {
        match self.last_pass_at {
            Some(last) if now_secs < last.saturating_add(self.min_interval_secs) => false,
            _ => {
                self.last_pass_at = Some(now_secs);
                true
            }
        }
    }
}
