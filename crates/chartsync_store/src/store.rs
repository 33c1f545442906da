//! The local record store contract.

use crate::error::StoreResult;
use crate::record::{RecordId, SyncRecord};
use crate::status::SyncStatus;
use serde::{Deserialize, Serialize};

/// Summary of a remote merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Records written to the store (new, or an acknowledged copy was
    /// overwritten).
    pub accepted: usize,
    /// Records skipped because the local copy carries an unsynced edit.
    pub skipped: usize,
    /// Records identical to the local copy; the payload was left untouched
    /// but any transient error flag was cleared.
    pub unchanged: usize,
}

impl MergeSummary {
    /// Total number of records the merge examined.
    pub fn total(&self) -> usize {
        self.accepted + self.skipped + self.unchanged
    }
}

/// A per-record rejection reported by the server during push.
///
/// Names exactly one record and the field-level problems the server found
/// with it. The rejected record reverts to `Pending` with this detail
/// attached, so the application layer can surface the offending fields
/// without resubmitting the snapshot verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordRejection {
    /// The rejected record.
    pub record_id: RecordId,
    /// Field-level error messages from the server.
    pub field_errors: Vec<String>,
}

impl RecordRejection {
    /// Creates a new rejection.
    pub fn new(record_id: RecordId, field_errors: Vec<String>) -> Self {
        Self {
            record_id,
            field_errors,
        }
    }
}

/// Local persistent storage for one record type, plus its sync metadata.
///
/// Every method is a single transaction: a crash after it returns must not
/// lose the write, and nothing from a failed call is assumed committed.
/// Implementations serialize writes internally, so concurrent sync
/// coordinators for different record types and concurrent application-layer
/// writes never corrupt each other.
pub trait RecordStore<R: SyncRecord>: Send + Sync {
    /// Returns records currently in `status`, up to `limit` if given.
    fn records_with_status(
        &self,
        status: SyncStatus,
        limit: Option<usize>,
    ) -> StoreResult<Vec<R>>;

    /// Application-layer upsert by identifier.
    ///
    /// Saved records land as `Pending` with any previously attached
    /// validation detail cleared (a new local edit supersedes an old
    /// rejection). Last write wins on duplicate identifiers within one call.
    fn save(&self, records: Vec<R>) -> StoreResult<()>;

    /// Atomically selects up to `limit` `Pending` records and marks them
    /// `InFlight` in the same transaction.
    ///
    /// The returned records form one push batch; a concurrent claim cannot
    /// observe them as `Pending` again, which is what prevents double
    /// submission. Records carrying a validation detail are not claimed:
    /// resubmitting them verbatim would fail again, so they wait for a fresh
    /// `save` to clear the detail.
    fn claim_pending(&self, limit: usize) -> StoreResult<Vec<R>>;

    /// Bulk status transition for the named records.
    ///
    /// Fails with `StoreError::InvalidTransition` if any record's current
    /// status does not permit the move, in which case nothing is applied.
    fn set_status(&self, ids: &[RecordId], to: SyncStatus) -> StoreResult<()>;

    /// Bulk status transition for every record currently in `from`.
    fn set_status_from_to(&self, from: SyncStatus, to: SyncStatus) -> StoreResult<()>;

    /// Merges remote snapshots into the store as one transaction.
    ///
    /// Applies the conflict policy per record (see
    /// [`can_overwrite`](crate::can_overwrite)); accepted records land as
    /// `Done`. Merging the same batch twice yields the same state as merging
    /// it once.
    fn merge_remote(&self, records: Vec<R>) -> StoreResult<MergeSummary>;

    /// Reverts the named records to `Pending` and attaches the server's
    /// validation detail.
    fn reject(&self, rejections: &[RecordRejection]) -> StoreResult<()>;

    /// Returns the validation detail attached to a record, if any.
    fn validation_errors(&self, id: RecordId) -> StoreResult<Option<Vec<String>>>;

    /// Number of records currently in `status`.
    fn count(&self, status: SyncStatus) -> StoreResult<usize>;
}
