//! # Chartsync Testkit
//!
//! Test utilities for chartsync.
//!
//! This crate provides:
//! - Concrete clinical record fixtures (`BloodPressure`, `Appointment`)
//! - Store fixture helpers
//! - Property-based test generators using proptest
//!
//! ## Usage
//!
//! ```
//! use chartsync_testkit::fixtures::store_with_pending;
//! use chartsync_store::{RecordStore, SyncStatus};
//!
//! let (store, records) = store_with_pending(3);
//! assert_eq!(store.count(SyncStatus::Pending).unwrap(), records.len());
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
