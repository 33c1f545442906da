//! Per-record-type sync orchestration.

use crate::cancel::CancelToken;
use crate::clock::{Clock, SystemClock};
use crate::config::SyncConfig;
use crate::cursor::CursorStore;
use crate::error::{SyncError, SyncResult};
use crate::pull::PullPipeline;
use crate::push::PushPipeline;
use crate::transport::SyncTransport;
use chartsync_store::{RecordStore, SyncRecord, SyncStatus};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// One sync registered with the scheduler.
///
/// Implemented by [`SyncCoordinator`] for every record type; the scheduler
/// is generic over this capability, not over entity types.
pub trait ModelSync: Send + Sync {
    /// Name of the record type, for logging and failure reports.
    fn name(&self) -> &str;

    /// The cadence and batch configuration for this record type.
    fn config(&self) -> &SyncConfig;

    /// Runs one push-then-pull cycle.
    fn sync(&self) -> SyncResult<()>;

    /// Returns true if this sync must not run without an approved session.
    fn requires_approved_session(&self) -> bool {
        false
    }
}

/// Counters accumulated across sync cycles.
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Cycles that completed without error.
    pub cycles_completed: u64,
    /// Records acknowledged by the server.
    pub records_pushed: u64,
    /// Remote records applied locally.
    pub records_pulled: u64,
    /// Records the server rejected with validation errors.
    pub records_rejected: u64,
    /// Message of the most recent failure, cleared on success.
    pub last_error: Option<String>,
    /// When the last successful cycle finished.
    pub last_completed_at: Option<DateTime<Utc>>,
}

/// Result of one successful sync cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// Records acknowledged by the server.
    pub pushed: usize,
    /// Remote records applied locally.
    pub pulled: usize,
    /// Remote records refused by the conflict policy.
    pub skipped: usize,
    /// Pull pages fetched.
    pub pages: usize,
}

/// Orchestrates push-then-pull for one record type.
///
/// Push runs first so the server holds the latest local state before pull
/// could re-import a stale remote copy. At most one cycle runs at a time: a
/// concurrent `sync()` returns `SyncError::AlreadyInProgress` rather than
/// racing the first cycle's batch claims.
pub struct SyncCoordinator<R: SyncRecord> {
    name: String,
    config: SyncConfig,
    store: Arc<dyn RecordStore<R>>,
    push: PushPipeline<R>,
    pull: PullPipeline<R>,
    clock: Arc<dyn Clock>,
    in_flight: AtomicBool,
    cancel: CancelToken,
    stats: RwLock<SyncStats>,
    requires_approved_session: bool,
}

impl<R: SyncRecord> SyncCoordinator<R> {
    /// Creates a coordinator over the given store, transport and cursor.
    pub fn new(
        name: impl Into<String>,
        config: SyncConfig,
        store: Arc<dyn RecordStore<R>>,
        transport: Arc<dyn SyncTransport<R>>,
        cursor: Arc<dyn CursorStore>,
    ) -> Self {
        Self {
            push: PushPipeline::new(Arc::clone(&store), Arc::clone(&transport)),
            pull: PullPipeline::new(Arc::clone(&store), transport, cursor),
            store,
            name: name.into(),
            config,
            clock: Arc::new(SystemClock),
            in_flight: AtomicBool::new(false),
            cancel: CancelToken::new(),
            stats: RwLock::new(SyncStats::default()),
            requires_approved_session: false,
        }
    }

    /// Replaces the clock used for bookkeeping timestamps.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Marks this sync as gated on an approved session.
    pub fn with_approved_session_required(mut self) -> Self {
        self.requires_approved_session = true;
        self
    }

    /// Runs one push-then-pull cycle.
    ///
    /// A push failure short-circuits the pull for this cycle and is reported
    /// distinctly from a pull failure, so callers can tell a network blip
    /// from a persistent validation problem.
    pub fn sync(&self) -> SyncResult<SyncOutcome> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            return Err(SyncError::AlreadyInProgress);
        }

        let result = self.run_cycle();
        self.record(&result);
        self.in_flight.store(false, Ordering::SeqCst);

        result
    }

    /// Requests cancellation of the cycle currently running, if any.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Returns true while a cycle is running.
    pub fn is_syncing(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Snapshot of the accumulated counters.
    pub fn stats(&self) -> SyncStats {
        self.stats.read().clone()
    }

    fn run_cycle(&self) -> SyncResult<SyncOutcome> {
        self.cancel.reset();

        // Requeue records a crashed or aborted previous cycle left in
        // flight; with at most one cycle per record type, any InFlight
        // record at this point is stale.
        self.store
            .set_status_from_to(SyncStatus::InFlight, SyncStatus::Pending)?;

        let push = self.push.run(self.config.push_batch_size, &self.cancel)?;
        let pull = self.pull.run(self.config.pull_batch_size, &self.cancel)?;

        debug!(
            name = %self.name,
            pushed = push.pushed,
            pulled = pull.pulled,
            "sync cycle completed"
        );

        Ok(SyncOutcome {
            pushed: push.pushed,
            pulled: pull.pulled,
            skipped: pull.skipped,
            pages: pull.pages,
        })
    }

    fn record(&self, result: &SyncResult<SyncOutcome>) {
        let mut stats = self.stats.write();
        match result {
            Ok(outcome) => {
                stats.cycles_completed += 1;
                stats.records_pushed += outcome.pushed as u64;
                stats.records_pulled += outcome.pulled as u64;
                stats.last_error = None;
                stats.last_completed_at = Some(self.clock.now());
            }
            Err(err) => {
                if let SyncError::Validation { rejected } = err {
                    stats.records_rejected += *rejected as u64;
                }
                stats.last_error = Some(err.to_string());
            }
        }
    }
}

impl<R: SyncRecord> ModelSync for SyncCoordinator<R> {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> &SyncConfig {
        &self.config
    }

    fn sync(&self) -> SyncResult<()> {
        SyncCoordinator::sync(self).map(|_| ())
    }

    fn requires_approved_session(&self) -> bool {
        self.requires_approved_session
    }
}
