//! Error types for the sync engine.

use chartsync_store::StoreError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during a sync cycle.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Transport or network failure. The affected push batch has been
    /// reverted to `Pending` and the pull cursor is unchanged, so the next
    /// cycle retries the exact same work.
    #[error("network failure: {0}")]
    Network(String),

    /// The server semantically rejected specific records. The rejected
    /// records are back in `Pending` with their validation detail attached;
    /// they are not resubmitted until the application layer edits them.
    #[error("server rejected {rejected} record(s)")]
    Validation {
        /// Number of records the server rejected this cycle.
        rejected: usize,
    },

    /// A sync for this record type is already running.
    #[error("a sync for this record type is already in progress")]
    AlreadyInProgress,

    /// A local store transaction failed; nothing from it is assumed
    /// committed and the cycle is abandoned.
    #[error("store error: {0}")]
    Storage(#[from] StoreError),

    /// The cycle was cancelled between network calls.
    #[error("sync cancelled")]
    Cancelled,
}

impl SyncError {
    /// Returns true if retrying the same cycle verbatim can succeed.
    ///
    /// Validation errors are excluded: resubmitting unmodified data will
    /// fail again. `AlreadyInProgress` and `Cancelled` are not failures of
    /// the sync itself.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SyncError::Network(_) | SyncError::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::Network("connection reset".into()).is_retryable());
        assert!(SyncError::Storage(StoreError::Backend("disk full".into())).is_retryable());

        assert!(!SyncError::Validation { rejected: 2 }.is_retryable());
        assert!(!SyncError::AlreadyInProgress.is_retryable());
        assert!(!SyncError::Cancelled.is_retryable());
    }

    #[test]
    fn error_display() {
        let err = SyncError::Validation { rejected: 3 };
        assert_eq!(err.to_string(), "server rejected 3 record(s)");

        let err = SyncError::Network("timed out".into());
        assert!(err.to_string().contains("timed out"));
    }
}
