//! # Chartsync Store
//!
//! Record model and local store contract for chartsync.
//!
//! This crate provides:
//! - `RecordId` and the `SyncRecord` capability trait
//! - The per-record sync lifecycle (`Pending` → `InFlight` → `Done`)
//! - The status-keyed conflict resolution policy
//! - The `RecordStore` contract every syncable record type implements
//! - `MemoryRecordStore`, an in-memory reference implementation
//!
//! ## Key Invariants
//!
//! - A record is never silently dropped: every local mutation either reaches
//!   `Done` or stays `Pending` (possibly carrying a validation detail)
//! - A record only becomes `Done` from `InFlight`, i.e. after the server
//!   acknowledged that exact snapshot
//! - Remote snapshots never overwrite local copies with unsynced edits

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod conflict;
mod error;
mod memory;
mod record;
mod status;
mod store;

pub use conflict::can_overwrite;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryRecordStore;
pub use record::{RecordId, SyncRecord};
pub use status::SyncStatus;
pub use store::{MergeSummary, RecordRejection, RecordStore};
