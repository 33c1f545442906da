//! # Chartsync Engine
//!
//! Offline-first record synchronization engine.
//!
//! This crate provides:
//! - Push pipeline: drains pending local records to the server in batches
//! - Pull pipeline: cursor-paged import of the remote record stream
//! - `SyncCoordinator`: push-then-pull per record type, one cycle at a time
//! - `SyncGroupScheduler`: cadence groups, bounded parallelism, progress
//!   events and last-sync bookkeeping
//! - Transport, cursor and clock abstractions with in-memory/mock
//!   implementations
//!
//! ## Architecture
//!
//! The engine implements a **push-then-pull** synchronization model per
//! record type:
//! 1. Push local `Pending` records first, so the server holds the latest
//!    local state
//! 2. Pull the remote stream page by page, merging through the conflict
//!    policy
//! 3. Advance the persisted pull cursor only after each page's merge commits
//!
//! ## Key Invariants
//!
//! - At most one sync cycle per record type is in flight
//! - A record is never `Done` without a server acknowledgement
//! - The pull cursor never moves past an unmerged page
//! - A failed cycle leaves everything retryable verbatim on the next tick

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cancel;
mod clock;
mod config;
mod coordinator;
mod cursor;
mod error;
mod events;
mod history;
mod pull;
mod push;
mod scheduler;
mod transport;

pub use cancel::CancelToken;
pub use clock::{Clock, SystemClock};
pub use config::{SyncConfig, SyncGroup};
pub use coordinator::{ModelSync, SyncCoordinator, SyncOutcome, SyncStats};
pub use cursor::{CursorStore, MemoryCursorStore};
pub use error::{SyncError, SyncResult};
pub use events::{GroupOutcome, SyncGroupEvent, SyncProgress};
pub use history::{MemorySyncHistory, SyncHistory};
pub use pull::{PullOutcome, PullPipeline};
pub use push::{PushOutcome, PushPipeline};
pub use scheduler::SyncGroupScheduler;
pub use transport::{MockTransport, SyncTransport};
