//! Error types for store operations.

use crate::record::RecordId;
use crate::status::SyncStatus;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A status transition the lifecycle forbids.
    #[error("invalid status transition from {from:?} to {to:?}")]
    InvalidTransition {
        /// Current status.
        from: SyncStatus,
        /// Attempted target status.
        to: SyncStatus,
    },

    /// A record named in a bulk operation does not exist.
    #[error("record {0} not found")]
    NotFound(RecordId),

    /// The storage backend failed; nothing from the failed call is assumed
    /// committed.
    #[error("storage backend error: {0}")]
    Backend(String),
}
