//! Per-record sync lifecycle.

use serde::{Deserialize, Serialize};

/// The sync lifecycle tag carried by every locally stored record.
///
/// Statuses are mutually exclusive and owned by the sync pipelines; the
/// application layer only ever produces fresh `Pending` records (via
/// `RecordStore::save`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncStatus {
    /// Created or modified locally, not yet acknowledged by the server.
    Pending,
    /// Included in a push batch currently awaiting a server response.
    InFlight,
    /// The server has acknowledged this exact snapshot.
    Done,
}

impl SyncStatus {
    /// Returns true if the lifecycle permits moving from `self` to `to`.
    ///
    /// Forward path: `Pending → InFlight → Done`. Rollback path:
    /// `InFlight → Pending` (network failure or per-record rejection).
    /// Self-transitions are permitted as no-ops so bulk updates stay
    /// idempotent. `Pending → Done` is forbidden: a record only becomes
    /// `Done` after the server acknowledged the in-flight snapshot.
    pub fn can_transition_to(self, to: SyncStatus) -> bool {
        matches!(
            (self, to),
            (SyncStatus::Pending, SyncStatus::InFlight)
                | (SyncStatus::InFlight, SyncStatus::Done)
                | (SyncStatus::InFlight, SyncStatus::Pending)
        ) || self == to
    }

    /// Returns true if the record carries a local edit the server does not
    /// know about yet.
    pub fn is_unsynced(&self) -> bool {
        matches!(self, SyncStatus::Pending | SyncStatus::InFlight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions() {
        assert!(SyncStatus::Pending.can_transition_to(SyncStatus::InFlight));
        assert!(SyncStatus::InFlight.can_transition_to(SyncStatus::Done));
    }

    #[test]
    fn rollback_transition() {
        assert!(SyncStatus::InFlight.can_transition_to(SyncStatus::Pending));
    }

    #[test]
    fn done_requires_server_ack() {
        assert!(!SyncStatus::Pending.can_transition_to(SyncStatus::Done));
        assert!(!SyncStatus::Done.can_transition_to(SyncStatus::InFlight));
        assert!(!SyncStatus::Done.can_transition_to(SyncStatus::Pending));
    }

    #[test]
    fn self_transitions_are_noops() {
        for status in [SyncStatus::Pending, SyncStatus::InFlight, SyncStatus::Done] {
            assert!(status.can_transition_to(status));
        }
    }

    #[test]
    fn unsynced_statuses() {
        assert!(SyncStatus::Pending.is_unsynced());
        assert!(SyncStatus::InFlight.is_unsynced());
        assert!(!SyncStatus::Done.is_unsynced());
    }
}
