//! In-memory reference implementation of the record store.

use crate::conflict::can_overwrite;
use crate::error::{StoreError, StoreResult};
use crate::record::{RecordId, SyncRecord};
use crate::status::SyncStatus;
use crate::store::{MergeSummary, RecordRejection, RecordStore};
use parking_lot::RwLock;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// A tracked record plus its sync metadata.
#[derive(Debug, Clone)]
struct Tracked<R> {
    record: R,
    status: SyncStatus,
    field_errors: Option<Vec<String>>,
}

/// An in-memory record store.
///
/// The write lock makes every method a single serialized transaction, which
/// is the durability contract real backends provide with database
/// transactions. Iteration order is by record identifier, so batch selection
/// is deterministic.
pub struct MemoryRecordStore<R> {
    records: RwLock<BTreeMap<RecordId, Tracked<R>>>,
}

impl<R: SyncRecord> MemoryRecordStore<R> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
        }
    }

    /// Returns the current status of a record, if it exists.
    pub fn status_of(&self, id: RecordId) -> Option<SyncStatus> {
        self.records.read().get(&id).map(|t| t.status)
    }

    /// Returns a snapshot of a record, if it exists.
    pub fn get(&self, id: RecordId) -> Option<R> {
        self.records.read().get(&id).map(|t| t.record.clone())
    }

    /// Total number of records, across all statuses.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<R: SyncRecord> Default for MemoryRecordStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: SyncRecord> RecordStore<R> for MemoryRecordStore<R> {
    fn records_with_status(
        &self,
        status: SyncStatus,
        limit: Option<usize>,
    ) -> StoreResult<Vec<R>> {
        let records = self.records.read();
        let matching = records
            .values()
            .filter(|t| t.status == status)
            .map(|t| t.record.clone());

        Ok(match limit {
            Some(limit) => matching.take(limit).collect(),
            None => matching.collect(),
        })
    }

    fn save(&self, incoming: Vec<R>) -> StoreResult<()> {
        let mut records = self.records.write();
        for record in incoming {
            records.insert(
                record.record_id(),
                Tracked {
                    record,
                    status: SyncStatus::Pending,
                    field_errors: None,
                },
            );
        }
        Ok(())
    }

    fn claim_pending(&self, limit: usize) -> StoreResult<Vec<R>> {
        let mut records = self.records.write();
        let mut claimed = Vec::new();

        for tracked in records.values_mut() {
            if claimed.len() == limit {
                break;
            }
            if tracked.status == SyncStatus::Pending && tracked.field_errors.is_none() {
                tracked.status = SyncStatus::InFlight;
                claimed.push(tracked.record.clone());
            }
        }

        Ok(claimed)
    }

    fn set_status(&self, ids: &[RecordId], to: SyncStatus) -> StoreResult<()> {
        let mut records = self.records.write();

        // Validate the whole batch before applying anything.
        for id in ids {
            let tracked = records.get(id).ok_or(StoreError::NotFound(*id))?;
            if !tracked.status.can_transition_to(to) {
                return Err(StoreError::InvalidTransition {
                    from: tracked.status,
                    to,
                });
            }
        }

        for id in ids {
            if let Some(tracked) = records.get_mut(id) {
                tracked.status = to;
            }
        }

        Ok(())
    }

    fn set_status_from_to(&self, from: SyncStatus, to: SyncStatus) -> StoreResult<()> {
        if !from.can_transition_to(to) {
            return Err(StoreError::InvalidTransition { from, to });
        }

        let mut records = self.records.write();
        for tracked in records.values_mut() {
            if tracked.status == from {
                tracked.status = to;
            }
        }

        Ok(())
    }

    fn merge_remote(&self, incoming: Vec<R>) -> StoreResult<MergeSummary> {
        let mut records = self.records.write();
        let mut summary = MergeSummary::default();

        for record in incoming {
            match records.entry(record.record_id()) {
                Entry::Vacant(entry) => {
                    entry.insert(Tracked {
                        record,
                        status: SyncStatus::Done,
                        field_errors: None,
                    });
                    summary.accepted += 1;
                }
                Entry::Occupied(mut entry) => {
                    let tracked = entry.get_mut();
                    if !can_overwrite(Some(tracked.status)) {
                        summary.skipped += 1;
                    } else if tracked.record == record {
                        // Identical snapshot: only clear transient flags.
                        tracked.field_errors = None;
                        summary.unchanged += 1;
                    } else {
                        tracked.record = record;
                        tracked.status = SyncStatus::Done;
                        tracked.field_errors = None;
                        summary.accepted += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    fn reject(&self, rejections: &[RecordRejection]) -> StoreResult<()> {
        let mut records = self.records.write();

        for rejection in rejections {
            let tracked = records
                .get_mut(&rejection.record_id)
                .ok_or(StoreError::NotFound(rejection.record_id))?;
            tracked.status = SyncStatus::Pending;
            tracked.field_errors = Some(rejection.field_errors.clone());
        }

        Ok(())
    }

    fn validation_errors(&self, id: RecordId) -> StoreResult<Option<Vec<String>>> {
        Ok(self
            .records
            .read()
            .get(&id)
            .and_then(|t| t.field_errors.clone()))
    }

    fn count(&self, status: SyncStatus) -> StoreResult<usize> {
        Ok(self
            .records
            .read()
            .values()
            .filter(|t| t.status == status)
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    #[derive(Debug, Clone, PartialEq)]
    struct Note {
        id: RecordId,
        body: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        deleted_at: Option<DateTime<Utc>>,
    }

    impl SyncRecord for Note {
        fn record_id(&self) -> RecordId {
            self.id
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }

        fn updated_at(&self) -> DateTime<Utc> {
            self.updated_at
        }

        fn deleted_at(&self) -> Option<DateTime<Utc>> {
            self.deleted_at
        }
    }

    fn note(body: &str) -> Note {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        Note {
            id: RecordId::new(),
            body: body.to_string(),
            created_at: at,
            updated_at: at,
            deleted_at: None,
        }
    }

    fn store_with_pending(n: usize) -> (MemoryRecordStore<Note>, Vec<Note>) {
        let store = MemoryRecordStore::new();
        let notes: Vec<Note> = (0..n).map(|i| note(&format!("note {i}"))).collect();
        store.save(notes.clone()).unwrap();
        (store, notes)
    }

    #[test]
    fn save_marks_records_pending() {
        let (store, notes) = store_with_pending(3);

        assert_eq!(store.count(SyncStatus::Pending).unwrap(), 3);
        for n in &notes {
            assert_eq!(store.status_of(n.record_id()), Some(SyncStatus::Pending));
        }
    }

    #[test]
    fn save_is_last_write_wins_within_one_call() {
        let store = MemoryRecordStore::new();
        let first = note("first");
        let mut second = first.clone();
        second.body = "second".to_string();

        store.save(vec![first, second.clone()]).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(second.id).unwrap().body, "second");
    }

    #[test]
    fn save_clears_previous_validation_detail() {
        let (store, notes) = store_with_pending(1);
        let id = notes[0].record_id();

        store.claim_pending(1).unwrap();
        store
            .reject(&[RecordRejection::new(id, vec!["body is empty".into()])])
            .unwrap();
        assert!(store.validation_errors(id).unwrap().is_some());

        let mut edited = notes[0].clone();
        edited.body = "edited".to_string();
        store.save(vec![edited]).unwrap();

        assert!(store.validation_errors(id).unwrap().is_none());
        assert_eq!(store.status_of(id), Some(SyncStatus::Pending));
    }

    #[test]
    fn records_with_status_honors_limit() {
        let (store, _) = store_with_pending(5);
        store.claim_pending(2).unwrap();

        let pending = store
            .records_with_status(SyncStatus::Pending, None)
            .unwrap();
        assert_eq!(pending.len(), 3);

        let capped = store
            .records_with_status(SyncStatus::Pending, Some(2))
            .unwrap();
        assert_eq!(capped.len(), 2);

        let in_flight = store
            .records_with_status(SyncStatus::InFlight, None)
            .unwrap();
        assert_eq!(in_flight.len(), 2);
    }

    #[test]
    fn claim_respects_limit_and_marks_in_flight() {
        let (store, _) = store_with_pending(5);

        let claimed = store.claim_pending(3).unwrap();

        assert_eq!(claimed.len(), 3);
        assert_eq!(store.count(SyncStatus::InFlight).unwrap(), 3);
        assert_eq!(store.count(SyncStatus::Pending).unwrap(), 2);
    }

    #[test]
    fn claimed_records_cannot_be_claimed_again() {
        let (store, _) = store_with_pending(2);

        let first = store.claim_pending(10).unwrap();
        let second = store.claim_pending(10).unwrap();

        assert_eq!(first.len(), 2);
        assert!(second.is_empty());
    }

    #[test]
    fn pending_cannot_jump_to_done() {
        let (store, notes) = store_with_pending(1);
        let ids = [notes[0].record_id()];

        let result = store.set_status(&ids, SyncStatus::Done);
        assert!(matches!(
            result,
            Err(StoreError::InvalidTransition { .. })
        ));
        assert_eq!(store.status_of(ids[0]), Some(SyncStatus::Pending));
    }

    #[test]
    fn set_status_is_all_or_nothing() {
        let (store, notes) = store_with_pending(2);
        let claimed_id = notes[0].record_id();
        store.set_status(&[claimed_id], SyncStatus::InFlight).unwrap();

        // Second id is still Pending, so InFlight → Done fails for it.
        let ids = [notes[1].record_id(), claimed_id];
        let result = store.set_status(&ids, SyncStatus::Done);

        assert!(result.is_err());
        assert_eq!(store.status_of(claimed_id), Some(SyncStatus::InFlight));
    }

    #[test]
    fn set_status_unknown_record() {
        let (store, _) = store_with_pending(1);

        let result = store.set_status(&[RecordId::new()], SyncStatus::InFlight);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn set_status_from_to_requeues_in_flight() {
        let (store, _) = store_with_pending(3);
        store.claim_pending(3).unwrap();

        store
            .set_status_from_to(SyncStatus::InFlight, SyncStatus::Pending)
            .unwrap();

        assert_eq!(store.count(SyncStatus::Pending).unwrap(), 3);
        assert_eq!(store.count(SyncStatus::InFlight).unwrap(), 0);
    }

    #[test]
    fn merge_accepts_unknown_records_as_done() {
        let store: MemoryRecordStore<Note> = MemoryRecordStore::new();
        let remote = note("from server");

        let summary = store.merge_remote(vec![remote.clone()]).unwrap();

        assert_eq!(summary.accepted, 1);
        assert_eq!(store.status_of(remote.record_id()), Some(SyncStatus::Done));
    }

    #[test]
    fn merge_never_overwrites_unsynced_edits() {
        let (store, notes) = store_with_pending(1);
        let mut remote = notes[0].clone();
        remote.body = "server version".to_string();

        let summary = store.merge_remote(vec![remote]).unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(store.get(notes[0].record_id()).unwrap().body, "note 0");
        assert_eq!(
            store.status_of(notes[0].record_id()),
            Some(SyncStatus::Pending)
        );
    }

    #[test]
    fn merge_overwrites_acknowledged_records() {
        let store: MemoryRecordStore<Note> = MemoryRecordStore::new();
        let original = note("v1");
        store.merge_remote(vec![original.clone()]).unwrap();

        let mut newer = original.clone();
        newer.body = "v2".to_string();
        newer.updated_at = newer.updated_at + chrono::Duration::minutes(5);
        let summary = store.merge_remote(vec![newer.clone()]).unwrap();

        assert_eq!(summary.accepted, 1);
        assert_eq!(store.get(original.record_id()).unwrap().body, "v2");
    }

    #[test]
    fn merge_is_idempotent() {
        let store: MemoryRecordStore<Note> = MemoryRecordStore::new();
        let remote = vec![note("a"), note("b")];

        let first = store.merge_remote(remote.clone()).unwrap();
        let second = store.merge_remote(remote.clone()).unwrap();

        assert_eq!(first.accepted, 2);
        assert_eq!(second.accepted, 0);
        assert_eq!(second.unchanged, 2);
        assert_eq!(second.total(), 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn identical_merge_clears_error_flag() {
        let store: MemoryRecordStore<Note> = MemoryRecordStore::new();
        let record = note("stable");
        store.merge_remote(vec![record.clone()]).unwrap();

        // Simulate a stale transient flag on an acknowledged record.
        store
            .records
            .write()
            .get_mut(&record.record_id())
            .unwrap()
            .field_errors = Some(vec!["stale".into()]);

        let summary = store.merge_remote(vec![record.clone()]).unwrap();

        assert_eq!(summary.unchanged, 1);
        assert!(store.validation_errors(record.record_id()).unwrap().is_none());
    }

    #[test]
    fn rejected_records_are_not_claimed_until_saved_again() {
        let (store, notes) = store_with_pending(1);
        let id = notes[0].record_id();

        store.claim_pending(1).unwrap();
        store
            .reject(&[RecordRejection::new(id, vec!["bad field".into()])])
            .unwrap();

        assert!(store.claim_pending(10).unwrap().is_empty());

        let mut edited = notes[0].clone();
        edited.body = "fixed".to_string();
        store.save(vec![edited]).unwrap();

        assert_eq!(store.claim_pending(10).unwrap().len(), 1);
    }

    #[test]
    fn reject_reverts_to_pending_with_detail() {
        let (store, notes) = store_with_pending(2);
        let claimed = store.claim_pending(2).unwrap();
        assert_eq!(claimed.len(), 2);

        let id = notes[0].record_id();
        store
            .reject(&[RecordRejection::new(id, vec!["bad field".into()])])
            .unwrap();

        assert_eq!(store.status_of(id), Some(SyncStatus::Pending));
        assert_eq!(
            store.validation_errors(id).unwrap(),
            Some(vec!["bad field".to_string()])
        );
        // The other claimed record is untouched.
        assert_eq!(
            store.status_of(notes[1].record_id()),
            Some(SyncStatus::InFlight)
        );
    }

    #[test]
    fn tombstones_merge_like_any_other_mutation() {
        let store: MemoryRecordStore<Note> = MemoryRecordStore::new();
        let record = note("to be deleted");
        store.merge_remote(vec![record.clone()]).unwrap();

        let mut tombstone = record.clone();
        tombstone.deleted_at = Some(tombstone.updated_at + chrono::Duration::hours(1));
        store.merge_remote(vec![tombstone.clone()]).unwrap();

        let stored = store.get(record.record_id()).unwrap();
        assert!(stored.is_deleted());
        assert_eq!(store.len(), 1);
    }
}
