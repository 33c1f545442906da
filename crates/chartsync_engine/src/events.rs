//! Collaborator-facing sync signals.

use crate::config::SyncGroup;

/// Progress of one group's sync run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncProgress {
    /// The group's coordinators are running.
    Syncing,
    /// Every coordinator in the group completed.
    Succeeded,
    /// At least one coordinator failed.
    Failed {
        /// Human-readable summary of the first failure.
        reason: String,
    },
}

/// A progress event for one sync group.
///
/// Produced by the scheduler without any knowledge of who consumes it; the
/// application layer typically drives a sync indicator from these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncGroupEvent {
    /// The group this event describes.
    pub group: SyncGroup,
    /// What happened.
    pub progress: SyncProgress,
}

/// Aggregated result of running every coordinator in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupOutcome {
    /// Every record type in the group synced.
    AllSucceeded,
    /// Some record types failed; the rest synced.
    PartialFailure(Vec<String>),
    /// Every record type in the group failed.
    AllFailed,
}

impl GroupOutcome {
    /// Returns true if every record type in the group synced.
    pub fn is_success(&self) -> bool {
        matches!(self, GroupOutcome::AllSucceeded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_success_check() {
        assert!(GroupOutcome::AllSucceeded.is_success());
        assert!(!GroupOutcome::PartialFailure(vec!["appointments".into()]).is_success());
        assert!(!GroupOutcome::AllFailed.is_success());
    }
}
