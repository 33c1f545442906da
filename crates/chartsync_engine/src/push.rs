//! Push pipeline: drains pending local records to the server.

use crate::cancel::CancelToken;
use crate::error::{SyncError, SyncResult};
use crate::transport::SyncTransport;
use chartsync_protocol::{PushRequest, RecordRejection};
use chartsync_store::{RecordId, RecordStore, SyncRecord, SyncStatus};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Result of a completed push.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushOutcome {
    /// Records the server acknowledged this cycle.
    pub pushed: usize,
    /// Push batches sent.
    pub batches: usize,
}

/// Uploads pending local records in batches and advances their status.
///
/// Push is at-least-once per record from the server's point of view: a crash
/// between the request and the status update may resubmit a batch, so the
/// remote side deduplicates on the record's UUID + `updated_at`.
pub struct PushPipeline<R: SyncRecord> {
    store: Arc<dyn RecordStore<R>>,
    transport: Arc<dyn SyncTransport<R>>,
}

impl<R: SyncRecord> PushPipeline<R> {
    /// Creates a pipeline over the given store and transport.
    pub fn new(store: Arc<dyn RecordStore<R>>, transport: Arc<dyn SyncTransport<R>>) -> Self {
        Self { store, transport }
    }

    /// Drains every pending record in batches of `batch_size`.
    ///
    /// On a transport failure the current batch reverts to `Pending` and the
    /// error propagates, so the next cycle retries the exact same records.
    /// Records the server rejects revert to `Pending` with their validation
    /// detail attached once the drain ends, and the run reports
    /// `SyncError::Validation`; they are excluded from future batches until
    /// the application layer edits them.
    pub fn run(&self, batch_size: usize, cancel: &CancelToken) -> SyncResult<PushOutcome> {
        let mut outcome = PushOutcome::default();
        let mut rejections: Vec<RecordRejection> = Vec::new();

        let drained = self.drain(batch_size, cancel, &mut outcome, &mut rejections);

        if !rejections.is_empty() {
            // Rejected records were held InFlight during the drain so they
            // could not be re-claimed; revert them now, with detail.
            warn!(
                rejected = rejections.len(),
                "server rejected records during push"
            );
            self.store.reject(&rejections)?;
        }

        drained?;

        if rejections.is_empty() {
            Ok(outcome)
        } else {
            Err(SyncError::Validation {
                rejected: rejections.len(),
            })
        }
    }

    fn drain(
        &self,
        batch_size: usize,
        cancel: &CancelToken,
        outcome: &mut PushOutcome,
        rejections: &mut Vec<RecordRejection>,
    ) -> SyncResult<()> {
        loop {
            cancel.check()?;

            let batch = self.store.claim_pending(batch_size)?;
            if batch.is_empty() {
                return Ok(());
            }

            let ids: Vec<RecordId> = batch.iter().map(|r| r.record_id()).collect();
            let request = PushRequest::new(batch);

            let response = match self.transport.push(&request) {
                Ok(response) => response,
                Err(err) => {
                    // Revert so the next cycle retries the same records.
                    self.store.set_status(&ids, SyncStatus::Pending)?;
                    return Err(err);
                }
            };

            let batch_ids: HashSet<RecordId> = ids.iter().copied().collect();
            let rejected: HashSet<RecordId> = response
                .rejected_ids()
                .into_iter()
                .filter(|id| batch_ids.contains(id))
                .collect();
            let accepted: Vec<RecordId> = ids
                .into_iter()
                .filter(|id| !rejected.contains(id))
                .collect();

            self.store.set_status(&accepted, SyncStatus::Done)?;
            outcome.pushed += accepted.len();
            outcome.batches += 1;

            // Rejections naming records outside this batch are ignored.
            rejections.extend(
                response
                    .errors
                    .into_iter()
                    .filter(|e| rejected.contains(&e.record_id)),
            );

            debug!(
                batch = outcome.batches,
                accepted = accepted.len(),
                rejected = rejected.len(),
                "push batch acknowledged"
            );
        }
    }
}
