//! Pull pipeline: paginates the remote record stream into the local store.

use crate::cancel::CancelToken;
use crate::cursor::CursorStore;
use crate::error::SyncResult;
use crate::transport::SyncTransport;
use chartsync_protocol::PullRequest;
use chartsync_store::{RecordStore, SyncRecord};
use std::sync::Arc;
use tracing::debug;

/// Result of a completed pull.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PullOutcome {
    /// Remote records applied locally (new, overwritten or confirmed
    /// identical).
    pub pulled: usize,
    /// Remote records refused because the local copy has unsynced edits.
    pub skipped: usize,
    /// Pages fetched.
    pub pages: usize,
}

/// Fetches the remote record stream page by page and merges it locally.
///
/// Each page is merged as one store transaction, and the resume token is
/// persisted only after that transaction commits. A crash mid-pagination
/// therefore re-fetches the same page, and merging it again is a no-op.
pub struct PullPipeline<R: SyncRecord> {
    store: Arc<dyn RecordStore<R>>,
    transport: Arc<dyn SyncTransport<R>>,
    cursor: Arc<dyn CursorStore>,
}

impl<R: SyncRecord> PullPipeline<R> {
    /// Creates a pipeline over the given store, transport and cursor.
    pub fn new(
        store: Arc<dyn RecordStore<R>>,
        transport: Arc<dyn SyncTransport<R>>,
        cursor: Arc<dyn CursorStore>,
    ) -> Self {
        Self {
            store,
            transport,
            cursor,
        }
    }

    /// Pages through the remote stream until caught up.
    ///
    /// Pagination ends when a page comes back shorter than `batch_size`
    /// (or empty) — not after a fixed page count — so a long pull adapts to
    /// server-side growth. On failure the cursor stays at the last committed
    /// page and the next run resumes exactly there.
    pub fn run(&self, batch_size: usize, cancel: &CancelToken) -> SyncResult<PullOutcome> {
        let mut outcome = PullOutcome::default();

        loop {
            cancel.check()?;

            let token = self.cursor.load()?;
            let response = self.transport.pull(&PullRequest::new(batch_size, token))?;
            let received = response.records.len();

            let summary = self.store.merge_remote(response.records)?;
            self.cursor.save(&response.process_token)?;

            outcome.pages += 1;
            outcome.pulled += summary.accepted + summary.unchanged;
            outcome.skipped += summary.skipped;

            debug!(
                page = outcome.pages,
                received,
                skipped = summary.skipped,
                "pull page merged"
            );

            if received < batch_size {
                return Ok(outcome);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::MemoryCursorStore;
    use crate::error::SyncError;
    use crate::transport::MockTransport;
    use chartsync_protocol::{ProcessToken, PullResponse};
    use chartsync_store::{MemoryRecordStore, SyncStatus};
    use chartsync_testkit::fixtures::{blood_pressures, store_with_pending, BloodPressure};

    struct Harness {
        store: Arc<MemoryRecordStore<BloodPressure>>,
        transport: Arc<MockTransport<BloodPressure>>,
        cursor: Arc<MemoryCursorStore>,
        pipeline: PullPipeline<BloodPressure>,
    }

    fn harness(store: Arc<MemoryRecordStore<BloodPressure>>) -> Harness {
        let transport = Arc::new(MockTransport::new());
        let cursor = Arc::new(MemoryCursorStore::new());
        let pipeline = PullPipeline::new(
            Arc::clone(&store) as Arc<dyn RecordStore<BloodPressure>>,
            Arc::clone(&transport) as Arc<dyn SyncTransport<BloodPressure>>,
            Arc::clone(&cursor) as Arc<dyn CursorStore>,
        );
        Harness {
            store,
            transport,
            cursor,
            pipeline,
        }
    }

    #[test]
    fn paginates_until_short_page() {
        let h = harness(Arc::new(MemoryRecordStore::new()));

        // 27 remote records served as pages of 10, 10 and 7.
        let remote = blood_pressures(27);
        h.transport.enqueue_pull_response(PullResponse::new(
            remote[0..10].to_vec(),
            ProcessToken::new("p1"),
        ));
        h.transport.enqueue_pull_response(PullResponse::new(
            remote[10..20].to_vec(),
            ProcessToken::new("p2"),
        ));
        h.transport.enqueue_pull_response(PullResponse::new(
            remote[20..27].to_vec(),
            ProcessToken::new("p3"),
        ));

        let outcome = h.pipeline.run(10, &CancelToken::new()).unwrap();

        assert_eq!(outcome.pages, 3);
        assert_eq!(outcome.pulled, 27);
        assert_eq!(h.store.count(SyncStatus::Done).unwrap(), 27);
        assert_eq!(h.cursor.load().unwrap(), Some(ProcessToken::new("p3")));

        // Page N+1 replays the token committed for page N.
        let tokens: Vec<Option<ProcessToken>> = h
            .transport
            .pull_requests()
            .into_iter()
            .map(|r| r.process_token)
            .collect();
        assert_eq!(
            tokens,
            vec![
                None,
                Some(ProcessToken::new("p1")),
                Some(ProcessToken::new("p2"))
            ]
        );
    }

    #[test]
    fn empty_first_page_means_converged() {
        let h = harness(Arc::new(MemoryRecordStore::new()));
        h.transport
            .enqueue_pull_response(PullResponse::new(vec![], ProcessToken::new("empty")));

        let outcome = h.pipeline.run(10, &CancelToken::new()).unwrap();

        assert_eq!(outcome.pages, 1);
        assert_eq!(outcome.pulled, 0);
        assert_eq!(h.cursor.load().unwrap(), Some(ProcessToken::new("empty")));
    }

    #[test]
    fn failure_mid_pagination_keeps_last_committed_cursor() {
        let h = harness(Arc::new(MemoryRecordStore::new()));
        let remote = blood_pressures(10);
        h.transport.enqueue_pull_response(PullResponse::new(
            remote.clone(),
            ProcessToken::new("p1"),
        ));
        h.transport.enqueue_pull_failure("gateway timeout");

        let result = h.pipeline.run(10, &CancelToken::new());

        assert!(matches!(result, Err(SyncError::Network(_))));
        assert_eq!(h.cursor.load().unwrap(), Some(ProcessToken::new("p1")));
        // The first page stayed merged.
        assert_eq!(h.store.count(SyncStatus::Done).unwrap(), 10);
    }

    #[test]
    fn replaying_a_page_is_idempotent() {
        let h = harness(Arc::new(MemoryRecordStore::new()));
        let remote = blood_pressures(5);

        // The same short page served twice, as after a crash before the
        // cursor advanced.
        h.transport.enqueue_pull_response(PullResponse::new(
            remote.clone(),
            ProcessToken::new("p1"),
        ));
        h.transport.enqueue_pull_response(PullResponse::new(
            remote.clone(),
            ProcessToken::new("p1"),
        ));

        h.pipeline.run(10, &CancelToken::new()).unwrap();
        let after_first: Vec<_> = (0..5).map(|i| h.store.get(remote[i].record_id())).collect();

        h.pipeline.run(10, &CancelToken::new()).unwrap();
        let after_second: Vec<_> = (0..5).map(|i| h.store.get(remote[i].record_id())).collect();

        assert_eq!(after_first, after_second);
        assert_eq!(h.store.len(), 5);
    }

    #[test]
    fn local_unsynced_edits_survive_pull() {
        let (store, local) = store_with_pending(1);
        let h = harness(store);

        let mut remote = local[0].clone();
        remote.systolic += 10;
        h.transport.enqueue_pull_response(PullResponse::new(
            vec![remote],
            ProcessToken::new("p1"),
        ));

        let outcome = h.pipeline.run(10, &CancelToken::new()).unwrap();

        assert_eq!(outcome.skipped, 1);
        assert_eq!(h.store.get(local[0].record_id()).unwrap(), local[0]);
        assert_eq!(
            h.store.status_of(local[0].record_id()),
            Some(SyncStatus::Pending)
        );
    }

    #[test]
    fn cancelled_run_stops_before_next_page() {
        let h = harness(Arc::new(MemoryRecordStore::new()));
        let cancel = CancelToken::new();
        cancel.cancel();

        let result = h.pipeline.run(10, &cancel);

        assert!(matches!(result, Err(SyncError::Cancelled)));
        assert_eq!(h.transport.pull_call_count(), 0);
        assert_eq!(h.cursor.load().unwrap(), None);
    }
}
