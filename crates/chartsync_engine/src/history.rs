//! Last-successful-sync bookkeeping.

use crate::config::SyncGroup;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Persistence for the per-group "last synced at" timestamp.
///
/// Survives process restarts in real deployments; the in-memory reference
/// implementation backs tests. Consumed by cadence decisions and
/// "last synced at T" display.
pub trait SyncHistory: Send + Sync {
    /// When the group last completed with every record type succeeding.
    fn last_success(&self, group: SyncGroup) -> Option<DateTime<Utc>>;

    /// Records a fully-successful group run.
    fn record_success(&self, group: SyncGroup, at: DateTime<Utc>);
}

/// An in-memory sync history.
#[derive(Debug, Default)]
pub struct MemorySyncHistory {
    timestamps: RwLock<HashMap<SyncGroup, DateTime<Utc>>>,
}

impl MemorySyncHistory {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SyncHistory for MemorySyncHistory {
    fn last_success(&self, group: SyncGroup) -> Option<DateTime<Utc>> {
        self.timestamps.read().get(&group).copied()
    }

    fn record_success(&self, group: SyncGroup, at: DateTime<Utc>) {
        self.timestamps.write().insert(group, at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn tracks_latest_success_per_group() {
        let history = MemorySyncHistory::new();
        assert_eq!(history.last_success(SyncGroup::Frequent), None);

        let first = Utc.with_ymd_and_hms(2024, 5, 10, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 5, 10, 8, 15, 0).unwrap();

        history.record_success(SyncGroup::Frequent, first);
        history.record_success(SyncGroup::Frequent, later);

        assert_eq!(history.last_success(SyncGroup::Frequent), Some(later));
        assert_eq!(history.last_success(SyncGroup::Daily), None);
    }
}
