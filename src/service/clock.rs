//! Wall-clock sources for the sequencers.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// A source of wall-clock time.
pub trait Clock: Send + Sync {
    /// Current unix time in milliseconds.
    fn now_millis(&self) -> i64;

    /// Current unix time in whole seconds.
    fn now_seconds(&self) -> i64 {
        self.now_millis().div_euclid(1000)
    }
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// A clock that only moves when told to.
#[derive(Debug, Default)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `seconds` (unix time).
    #[must_use]
    pub const fn at_seconds(seconds: i64) -> Self {
        Self {
            millis: AtomicI64::new(seconds * 1000),
        }
    }

    /// Jump to `seconds` (unix time).
    pub fn set_seconds(&self, seconds: i64) {
        self.millis.store(seconds * 1000, Ordering::SeqCst);
    }

    /// Move the clock by `millis` (may be negative).
    pub fn advance_millis(&self, millis: i64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_past_epoch() {
        // 2023-01-01
        assert!(SystemClock.now_seconds() > 1_672_531_200);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::at_seconds(100);
        assert_eq!(clock.now_seconds(), 100);

        clock.advance_millis(1_500);
        assert_eq!(clock.now_millis(), 101_500);
        assert_eq!(clock.now_seconds(), 101);

        clock.advance_millis(-2_000);
        assert_eq!(clock.now_seconds(), 99);

        clock.set_seconds(7);
        assert_eq!(clock.now_millis(), 7_000);
    }

    #[test]
    fn test_seconds_round_down_before_unix_epoch() {
        let clock = ManualClock::at_seconds(0);
        clock.advance_millis(-1);
        assert_eq!(clock.now_seconds(), -1);
    }
}
