// SPDX-License-Identifier: MIT

//! Clock abstraction for testable time handling.
//!
//! Every worker in the background pipeline reads time through this trait
//! instead of calling `Utc::now()`/`Instant::now()` directly, so tests can
//! drive a [`FakeClock`] deterministically through misfire grace windows,
//! 15-minute activity boundaries, and reminder offsets.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Instant;

/// A source of both wall-clock and monotonic time.
pub trait Clock: Send + Sync {
    /// Current wall-clock time, UTC.
    fn now_utc(&self) -> DateTime<Utc>;
    /// Current monotonic instant, for scheduling math that must not be
    /// disturbed by clock adjustments.
    fn monotonic(&self) -> Instant;
}

/// Real system clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn monotonic(&self) -> Instant {
        Instant::now()
    }
}

/// Fake clock for tests with controllable wall-clock time.
///
/// `monotonic()` tracks wall-clock advances so code that mixes both (the
/// scheduler's misfire math does) sees a consistent timeline.
#[derive(Clone)]
pub struct FakeClock {
    now: Arc<Mutex<DateTime<Utc>>>,
    started: Instant,
    offset: Arc<Mutex<chrono::Duration>>,
}

impl FakeClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
            started: Instant::now(),
            offset: Arc::new(Mutex::new(chrono::Duration::zero())),
        }
    }

    /// Advance the clock by the given duration.
    pub fn advance(&self, duration: chrono::Duration) {
        *self.now.lock() += duration;
        *self.offset.lock() += duration;
    }

    /// Jump the clock to a specific instant.
    pub fn set(&self, at: DateTime<Utc>) {
        let mut now = self.now.lock();
        *self.offset.lock() += at - *now;
        *now = at;
    }
}

impl Clock for FakeClock {
    fn now_utc(&self) -> DateTime<Utc> {
        *self.now.lock()
    }

    fn monotonic(&self) -> Instant {
        let offset = *self.offset.lock();
        // `Instant` has no checked-negative arithmetic; clamp at zero so a
        // clock reset doesn't wrap.
        match offset.to_std() {
            Ok(d) => self.started + d,
            Err(_) => self.started,
        }
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
