//! Concrete record fixtures and store helpers.

use chartsync_store::{MemoryRecordStore, RecordId, RecordStore, SyncRecord};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A blood pressure measurement, the workhorse fixture record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressure {
    /// Record identifier.
    pub id: RecordId,
    /// The patient this reading belongs to.
    pub patient_id: RecordId,
    /// Systolic reading, mmHg.
    pub systolic: u16,
    /// Diastolic reading, mmHg.
    pub diastolic: u16,
    /// When the reading was taken.
    pub recorded_at: DateTime<Utc>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When this snapshot was produced.
    pub updated_at: DateTime<Utc>,
    /// Tombstone timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SyncRecord for BloodPressure {
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

/// Scheduling state of an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Booked, not yet visited.
    Scheduled,
    /// The patient showed up.
    Visited,
    /// Cancelled before the visit.
    Cancelled,
}

/// A scheduled patient visit, the second fixture record type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    /// Record identifier.
    pub id: RecordId,
    /// The patient this appointment is for.
    pub patient_id: RecordId,
    /// When the visit is due.
    pub scheduled_at: DateTime<Utc>,
    /// Scheduling state.
    pub status: AppointmentStatus,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When this snapshot was produced.
    pub updated_at: DateTime<Utc>,
    /// Tombstone timestamp.
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SyncRecord for Appointment {
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

/// A fresh blood pressure reading with the given values.
pub fn blood_pressure(systolic: u16, diastolic: u16) -> BloodPressure {
    let now = Utc::now();
    BloodPressure {
        id: RecordId::new(),
        patient_id: RecordId::new(),
        systolic,
        diastolic,
        recorded_at: now,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// A batch of distinct readings.
pub fn blood_pressures(n: usize) -> Vec<BloodPressure> {
    (0..n)
        .map(|i| blood_pressure(110 + (i % 60) as u16, 70 + (i % 30) as u16))
        .collect()
}

/// A newer snapshot of the same record: same identifier, bumped readings,
/// `updated_at` five minutes later.
pub fn newer_copy(record: &BloodPressure) -> BloodPressure {
    let mut copy = record.clone();
    copy.systolic += 2;
    copy.updated_at = record.updated_at + Duration::minutes(5);
    copy
}

/// A tombstone snapshot of the same record.
pub fn tombstone_of(record: &BloodPressure) -> BloodPressure {
    let mut copy = record.clone();
    copy.deleted_at = Some(record.updated_at + Duration::minutes(5));
    copy.updated_at = record.updated_at + Duration::minutes(5);
    copy
}

/// A fresh appointment.
pub fn appointment() -> Appointment {
    let now = Utc::now();
    Appointment {
        id: RecordId::new(),
        patient_id: RecordId::new(),
        scheduled_at: now + Duration::days(7),
        status: AppointmentStatus::Scheduled,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// A batch of distinct appointments.
pub fn appointments(n: usize) -> Vec<Appointment> {
    (0..n).map(|_| appointment()).collect()
}

/// A store pre-loaded with `n` pending readings, plus the readings.
pub fn store_with_pending(
    n: usize,
) -> (Arc<MemoryRecordStore<BloodPressure>>, Vec<BloodPressure>) {
    let store = Arc::new(MemoryRecordStore::new());
    let records = blood_pressures(n);
    store.save(records.clone()).expect("save fixtures");
    (store, records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartsync_store::SyncStatus;

    #[test]
    fn fixtures_are_distinct_records() {
        let batch = blood_pressures(10);
        let mut ids: Vec<RecordId> = batch.iter().map(|r| r.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn newer_copy_keeps_identity() {
        let record = blood_pressure(120, 80);
        let newer = newer_copy(&record);

        assert_eq!(newer.id, record.id);
        assert!(newer.updated_at > record.updated_at);
        assert_ne!(newer, record);
    }

    #[test]
    fn tombstone_is_deleted() {
        let record = blood_pressure(120, 80);
        assert!(!record.is_deleted());
        assert!(tombstone_of(&record).is_deleted());
    }

    #[test]
    fn store_fixture_is_pending() {
        let (store, records) = store_with_pending(4);
        assert_eq!(store.count(SyncStatus::Pending).unwrap(), 4);
        assert_eq!(records.len(), 4);
    }

    #[test]
    fn fixture_records_serialize_to_json() {
        let record = blood_pressure(120, 80);
        let json = serde_json::to_string(&record).unwrap();
        let back: BloodPressure = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);

        let appointment = appointment();
        let json = serde_json::to_value(&appointment).unwrap();
        assert_eq!(json["status"], "scheduled");
    }
}
