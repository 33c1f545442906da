//! Injectable wall-clock.

use chrono::{DateTime, Utc};

/// Source of the current time.
///
/// Injected wherever the engine stamps last-sync bookkeeping, so tests can
/// pin the clock instead of depending on the host's.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// The host system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
