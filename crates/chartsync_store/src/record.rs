//! Record identity and the capability contract for syncable types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A globally-unique record identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    /// Creates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for RecordId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Capability contract for a record type that can be synchronized.
///
/// Records are immutable value snapshots: a "mutation" is a new snapshot with
/// the same identifier and a newer `updated_at`. Deletion is a tombstone
/// (`deleted_at`) that travels the same push/pull path as any other mutation;
/// the sync layer never hard-deletes.
///
/// `PartialEq` compares whole snapshots and is what the store uses to detect
/// a byte-identical remote copy.
pub trait SyncRecord: Clone + PartialEq + Send + Sync + 'static {
    /// The record's globally-unique identifier.
    fn record_id(&self) -> RecordId;

    /// When this record was first created.
    fn created_at(&self) -> DateTime<Utc>;

    /// When this snapshot was produced.
    fn updated_at(&self) -> DateTime<Utc>;

    /// Tombstone timestamp, if the record has been deleted.
    fn deleted_at(&self) -> Option<DateTime<Utc>>;

    /// Returns true if this snapshot is a tombstone.
    fn is_deleted(&self) -> bool {
        self.deleted_at().is_some()
    }
}
