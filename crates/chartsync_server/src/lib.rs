//! # Chartsync Server
//!
//! In-memory reference server for the chartsync push/pull protocol.
//!
//! This crate provides:
//! - A sequence-ordered authoritative record log
//! - Push handling with idempotent upserts and pluggable per-record
//!   validation
//! - Token-paged pull handling
//!
//! The server exists to give clients something real to converge against in
//! integration tests; a production deployment would put the same handlers
//! behind HTTP endpoints.
//!
//! # Protocol
//!
//! 1. Client pushes batches of record snapshots; the response names exactly
//!    the rejected records
//! 2. Client pulls pages with an opaque resume token; a page shorter than
//!    the requested limit means the client has caught up
//! 3. Duplicate pushes of the same snapshot (same id, same `updated_at`) are
//!    acknowledged without creating new log entries

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod log;
mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use log::RecordLog;
pub use server::SyncServer;
