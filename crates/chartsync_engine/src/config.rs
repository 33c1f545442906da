//! Sync cadence and batch sizing configuration.

use std::time::Duration;

/// A named collection of record types sharing one cadence.
///
/// Frequently-edited clinical data (measurements, appointments) syncs every
/// few minutes while the app is in use; slow-moving reference data syncs
/// once a day with larger batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncGroup {
    /// Synced on a short cadence.
    Frequent,
    /// Synced once per day.
    Daily,
}

impl SyncGroup {
    /// All groups, in scheduling order.
    pub fn all() -> [SyncGroup; 2] {
        [SyncGroup::Frequent, SyncGroup::Daily]
    }

    /// The default tick period for this group.
    pub fn default_period(&self) -> Duration {
        match self {
            SyncGroup::Frequent => Duration::from_secs(15 * 60),
            SyncGroup::Daily => Duration::from_secs(24 * 60 * 60),
        }
    }
}

impl std::fmt::Display for SyncGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncGroup::Frequent => f.write_str("frequent"),
            SyncGroup::Daily => f.write_str("daily"),
        }
    }
}

/// Configuration for one record type's sync.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// The scheduling group this record type belongs to.
    pub group: SyncGroup,
    /// How often the group's timer ticks.
    pub interval: Duration,
    /// Maximum records per push batch.
    pub push_batch_size: usize,
    /// Maximum records per pull page.
    pub pull_batch_size: usize,
}

impl SyncConfig {
    /// Configuration for the frequent group.
    pub fn frequent() -> Self {
        Self {
            group: SyncGroup::Frequent,
            interval: SyncGroup::Frequent.default_period(),
            push_batch_size: 50,
            pull_batch_size: 100,
        }
    }

    /// Configuration for the daily group, with larger batches.
    pub fn daily() -> Self {
        Self {
            group: SyncGroup::Daily,
            interval: SyncGroup::Daily.default_period(),
            push_batch_size: 250,
            pull_batch_size: 1000,
        }
    }

    /// Sets the tick interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Sets the push batch size.
    pub fn with_push_batch_size(mut self, size: usize) -> Self {
        self.push_batch_size = size;
        self
    }

    /// Sets the pull page size.
    pub fn with_pull_batch_size(mut self, size: usize) -> Self {
        self.pull_batch_size = size;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_defaults() {
        let frequent = SyncConfig::frequent();
        assert_eq!(frequent.group, SyncGroup::Frequent);
        assert_eq!(frequent.interval, Duration::from_secs(900));

        let daily = SyncConfig::daily();
        assert_eq!(daily.group, SyncGroup::Daily);
        assert!(daily.pull_batch_size > frequent.pull_batch_size);
    }

    #[test]
    fn builder_overrides() {
        let config = SyncConfig::frequent()
            .with_interval(Duration::from_secs(60))
            .with_push_batch_size(5)
            .with_pull_batch_size(7);

        assert_eq!(config.interval, Duration::from_secs(60));
        assert_eq!(config.push_batch_size, 5);
        assert_eq!(config.pull_batch_size, 7);
    }

    #[test]
    fn group_display() {
        assert_eq!(SyncGroup::Frequent.to_string(), "frequent");
        assert_eq!(SyncGroup::Daily.to_string(), "daily");
    }
}
