//! Injectable wall clock.
//!
//! Report filenames embed the local time at the moment the report is
//! generated. Reading the time through [`Clock`] keeps that deterministic
//! in tests: inject a [`FixedClock`] and the filename is known up front.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::sync::Arc;

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The real system clock in the local time zone. This is the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    pub fn new(at: DateTime<Local>) -> Self {
        Self(at)
    }

    /// Freeze at a naive local wall time, e.g. `2024-03-05 09:07`.
    ///
    /// Returns `None` when the wall time does not exist in the local zone
    /// (skipped by a DST transition). Ambiguous times resolve to the
    /// earlier instant.
    pub fn at_local(naive: NaiveDateTime) -> Option<Self> {
        Local.from_local_datetime(&naive).earliest().map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Convenience alias matching the type stored in [`crate::config::AdvisorConfig`].
pub type SharedClock = Arc<dyn Clock>;
