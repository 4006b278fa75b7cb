//! Wall-clock abstraction.
//!
//! Game rules never read the clock themselves; the scheduler and the API
//! ask a [`Clock`] for `now` and pass it in. Production uses
//! [`SystemClock`]; tests use [`ManualClock`] and move time by hand.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

/// Errors that can occur during clock operations.
#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    /// The requested instant is outside the representable range.
    #[error("clock out of range: cannot advance by {seconds} s")]
    OutOfRange {
        /// The requested step, in seconds.
        seconds: i64,
    },
}

/// Source of the current instant.
pub trait Clock: Send + Sync + core::fmt::Debug {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The real UTC wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
///
/// Stored as microseconds since the epoch so it can be shared across
/// tasks without a lock.
#[derive(Debug)]
pub struct ManualClock {
    micros: AtomicI64,
}

impl ManualClock {
    /// A clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            micros: AtomicI64::new(start.timestamp_micros()),
        }
    }

    /// Jump to `at`.
    pub fn set(&self, at: DateTime<Utc>) {
        self.micros.store(at.timestamp_micros(), Ordering::SeqCst);
    }

    /// Move forward by `step` and return the new instant.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::OutOfRange`] if the result cannot be
    /// represented.
    pub fn advance(&self, step: Duration) -> Result<DateTime<Utc>, ClockError> {
        let out_of_range = || ClockError::OutOfRange {
            seconds: step.num_seconds(),
        };
        let next = self
            .now()
            .checked_add_signed(step)
            .ok_or_else(out_of_range)?;
        self.set(next);
        Ok(next)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        // Only valid instants are ever stored.
        DateTime::from_timestamp_micros(self.micros.load(Ordering::SeqCst)).unwrap_or_default()
    }
}
