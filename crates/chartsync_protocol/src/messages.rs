//! Push and pull RPC envelopes.

use crate::token::ProcessToken;
use chartsync_store::{RecordId, RecordRejection};
use serde::{Deserialize, Serialize};

/// A batch of local record snapshots uploaded to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushRequest<P> {
    /// The record payloads in this batch.
    pub records: Vec<P>,
}

impl<P> PushRequest<P> {
    /// Creates a push request for one batch.
    pub fn new(records: Vec<P>) -> Self {
        Self { records }
    }

    /// Number of records in the batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// The server's answer to a push.
///
/// An empty `errors` list means the whole batch was accepted. Entries name
/// exactly the rejected records; everything else in the batch is
/// acknowledged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PushResponse {
    /// Per-record validation errors, empty on full acceptance.
    #[serde(default)]
    pub errors: Vec<RecordRejection>,
}

impl PushResponse {
    /// A response accepting the whole batch.
    pub fn accepted() -> Self {
        Self { errors: Vec::new() }
    }

    /// A response rejecting the named records.
    pub fn with_errors(errors: Vec<RecordRejection>) -> Self {
        Self { errors }
    }

    /// Returns true if every record in the batch was accepted.
    pub fn is_fully_accepted(&self) -> bool {
        self.errors.is_empty()
    }

    /// Identifiers of the rejected records.
    pub fn rejected_ids(&self) -> Vec<RecordId> {
        self.errors.iter().map(|e| e.record_id).collect()
    }
}

/// A request for the next page of the remote record stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullRequest {
    /// Maximum number of records to return.
    pub limit: usize,
    /// Resume token from the previous page; absent on initial sync.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process_token: Option<ProcessToken>,
}

impl PullRequest {
    /// A request resuming from `token`, or from the beginning of time when
    /// `token` is `None`.
    pub fn new(limit: usize, process_token: Option<ProcessToken>) -> Self {
        Self {
            limit,
            process_token,
        }
    }
}

/// One page of the remote record stream.
///
/// A page shorter than the requested limit (or empty) signals that the
/// client has caught up. The returned token is opaque and must be persisted
/// verbatim once the page is durably merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PullResponse<P> {
    /// The record payloads in this page.
    pub records: Vec<P>,
    /// Resume token to replay on the next request.
    pub process_token: ProcessToken,
}

impl<P> PullResponse<P> {
    /// Creates a pull response page.
    pub fn new(records: Vec<P>, process_token: ProcessToken) -> Self {
        Self {
            records,
            process_token,
        }
    }

    /// Returns true if this page ends the pagination for now.
    pub fn is_final_page(&self, requested_limit: usize) -> bool {
        self.records.len() < requested_limit
    }
}
