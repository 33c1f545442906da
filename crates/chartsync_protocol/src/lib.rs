//! # Chartsync Protocol
//!
//! Wire types for the chartsync push/pull RPC.
//!
//! This crate provides:
//! - `PushRequest` / `PushResponse` with per-record validation errors
//! - `PullRequest` / `PullResponse` with opaque resume tokens
//! - `ProcessToken`, the persisted pull cursor value
//!
//! This is a pure protocol crate with no I/O operations. Payload types are
//! generic: any record type implementing serde's traits rides the same
//! envelopes.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod messages;
mod token;

pub use messages::{PullRequest, PullResponse, PushRequest, PushResponse};
pub use token::ProcessToken;

pub use chartsync_store::RecordRejection;
