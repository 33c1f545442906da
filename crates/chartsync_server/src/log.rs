//! Sequence-ordered authoritative record log.

use chartsync_store::{RecordId, SyncRecord};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;

struct Inner<R> {
    /// Latest snapshot of each record, keyed by its log sequence.
    by_seq: BTreeMap<u64, R>,
    /// Current sequence of each record.
    latest: HashMap<RecordId, u64>,
    next_seq: u64,
}

/// The server-side record log.
///
/// Each accepted snapshot gets a monotonically increasing sequence number;
/// updating a record moves it to a fresh sequence at the tail, so a client
/// paging from any point always ends up with the latest version of every
/// record. Sequence numbers are what pull tokens encode.
pub struct RecordLog<R> {
    inner: RwLock<Inner<R>>,
}

impl<R: SyncRecord> RecordLog<R> {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                by_seq: BTreeMap::new(),
                latest: HashMap::new(),
                next_seq: 1,
            }),
        }
    }

    /// Upserts a snapshot and returns its sequence.
    ///
    /// Idempotent by (id, `updated_at`): replaying a snapshot the log
    /// already holds, or an older one, is acknowledged with the existing
    /// sequence and creates no new entry. This is what makes at-least-once
    /// push safe.
    pub fn upsert(&self, record: R) -> u64 {
        let mut inner = self.inner.write();
        let id = record.record_id();

        if let Some(prior_seq) = inner.latest.get(&id).copied() {
            if let Some(existing) = inner.by_seq.get(&prior_seq) {
                if record.updated_at() <= existing.updated_at() {
                    return prior_seq;
                }
            }
            inner.by_seq.remove(&prior_seq);
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.by_seq.insert(seq, record);
        inner.latest.insert(id, seq);
        seq
    }

    /// Returns up to `limit` records with sequences strictly after `after`,
    /// plus the last sequence the page covers (`after` itself when the page
    /// is empty).
    pub fn page_after(&self, after: u64, limit: usize) -> (Vec<R>, u64) {
        let inner = self.inner.read();
        let mut records = Vec::new();
        let mut last = after;

        for (&seq, record) in inner
            .by_seq
            .range((Bound::Excluded(after), Bound::Unbounded))
        {
            if records.len() == limit {
                break;
            }
            records.push(record.clone());
            last = seq;
        }

        (records, last)
    }

    /// Highest sequence assigned so far.
    pub fn high_watermark(&self) -> u64 {
        self.inner.read().next_seq - 1
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        self.inner.read().by_seq.len()
    }

    /// Returns true if the log holds no records.
    pub fn is_empty(&self) -> bool {
        self.inner.read().by_seq.is_empty()
    }
}

impl<R: SyncRecord> Default for RecordLog<R> {
    fn default() -> Self {
        Self::new()
    }
}
