//! Clock abstraction.
//!
//! Expiration checks read the clock at evaluation time, so the outcome of
//! a query may change without any state mutation.

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;

/// Source of the global, monotonically non-decreasing time.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A manually driven clock for tests and simulations.
///
/// The clock never moves backwards: `set` to an earlier instant is ignored.
#[derive(Debug)]
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    /// Create a clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    /// Create a clock frozen at the given unix timestamp (seconds).
    pub fn at_unix(seconds: i64) -> Self {
        Self::new(DateTime::from_timestamp(seconds, 0).unwrap_or_default())
    }

    /// Advance the clock by `delta`. Negative deltas are ignored.
    pub fn advance(&self, delta: Duration) {
        if delta < Duration::zero() {
            return;
        }
        let mut now = self.now.write();
        *now += delta;
    }

    /// Move the clock to `instant` if it is not in the past.
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut now = self.now.write();
        if instant > *now {
            *now = instant;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}
