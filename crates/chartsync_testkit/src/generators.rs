//! Property-based test generators using proptest.

use crate::fixtures::BloodPressure;
use chartsync_store::{RecordId, SyncStatus};
use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

/// Base instant for generated timestamps.
const EPOCH: i64 = 1_600_000_000;

/// Strategy for record identifiers.
pub fn record_id_strategy() -> impl Strategy<Value = RecordId> {
    prop::array::uniform16(any::<u8>())
        .prop_map(|bytes| RecordId::from_uuid(Uuid::from_bytes(bytes)))
}

/// Strategy for sync statuses.
pub fn sync_status_strategy() -> impl Strategy<Value = SyncStatus> {
    prop_oneof![
        Just(SyncStatus::Pending),
        Just(SyncStatus::InFlight),
        Just(SyncStatus::Done),
    ]
}

/// Strategy for blood pressure readings with plausible vitals and
/// deterministic timestamps.
pub fn blood_pressure_strategy() -> impl Strategy<Value = BloodPressure> {
    (
        record_id_strategy(),
        record_id_strategy(),
        60u16..260,
        40u16..160,
        0i64..1_000_000,
    )
        .prop_map(|(id, patient_id, systolic, diastolic, offset)| {
            let at = Utc.timestamp_opt(EPOCH + offset, 0).unwrap();
            BloodPressure {
                id,
                patient_id,
                systolic,
                diastolic,
                recorded_at: at,
                created_at: at,
                updated_at: at,
                deleted_at: None,
            }
        })
}

/// Strategy for batches of readings, possibly repeating identifiers.
pub fn blood_pressure_batch_strategy(
    max_len: usize,
) -> impl Strategy<Value = Vec<BloodPressure>> {
    prop::collection::vec(blood_pressure_strategy(), 0..max_len)
}
