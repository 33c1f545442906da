//! Transport layer abstraction for the push/pull RPC.

use crate::error::{SyncError, SyncResult};
use chartsync_protocol::{PullRequest, PullResponse, PushRequest, PushResponse};
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Network communication with the remote record store, for one record type.
///
/// This trait abstracts the wire entirely; implementations may speak HTTP,
/// loop back into an in-process server, or script responses for tests. The
/// engine treats any transport-level failure as `SyncError::Network`.
pub trait SyncTransport<P>: Send + Sync {
    /// Uploads one batch of local record snapshots.
    fn push(&self, request: &PushRequest<P>) -> SyncResult<PushResponse>;

    /// Fetches the next page of the remote record stream.
    fn pull(&self, request: &PullRequest) -> SyncResult<PullResponse<P>>;
}

/// A scripted transport for tests.
///
/// Responses are consumed in FIFO order; a request with no scripted response
/// fails as a network error. Every request is recorded and can be inspected
/// afterwards.
pub struct MockTransport<P> {
    push_responses: Mutex<VecDeque<SyncResult<PushResponse>>>,
    pull_responses: Mutex<VecDeque<SyncResult<PullResponse<P>>>>,
    push_requests: Mutex<Vec<PushRequest<P>>>,
    pull_requests: Mutex<Vec<PullRequest>>,
}

impl<P> MockTransport<P> {
    /// Creates a transport with no scripted responses.
    pub fn new() -> Self {
        Self {
            push_responses: Mutex::new(VecDeque::new()),
            pull_responses: Mutex::new(VecDeque::new()),
            push_requests: Mutex::new(Vec::new()),
            pull_requests: Mutex::new(Vec::new()),
        }
    }

    /// Queues a push response.
    pub fn enqueue_push_response(&self, response: PushResponse) {
        self.push_responses.lock().push_back(Ok(response));
    }

    /// Queues a push failure.
    pub fn enqueue_push_failure(&self, message: impl Into<String>) {
        self.push_responses
            .lock()
            .push_back(Err(SyncError::Network(message.into())));
    }

    /// Queues a pull response page.
    pub fn enqueue_pull_response(&self, response: PullResponse<P>) {
        self.pull_responses.lock().push_back(Ok(response));
    }

    /// Queues a pull failure.
    pub fn enqueue_pull_failure(&self, message: impl Into<String>) {
        self.pull_responses
            .lock()
            .push_back(Err(SyncError::Network(message.into())));
    }

    /// Number of push requests seen so far.
    pub fn push_call_count(&self) -> usize {
        self.push_requests.lock().len()
    }

    /// Number of pull requests seen so far.
    pub fn pull_call_count(&self) -> usize {
        self.pull_requests.lock().len()
    }

    /// All pull requests seen so far.
    pub fn pull_requests(&self) -> Vec<PullRequest> {
        self.pull_requests.lock().clone()
    }
}

impl<P: Clone> MockTransport<P> {
    /// All push requests seen so far.
    pub fn push_requests(&self) -> Vec<PushRequest<P>> {
        self.push_requests.lock().clone()
    }
}

impl<P> Default for MockTransport<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Clone + Send + Sync> SyncTransport<P> for MockTransport<P> {
    fn push(&self, request: &PushRequest<P>) -> SyncResult<PushResponse> {
        self.push_requests.lock().push(request.clone());
        self.push_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::Network("no scripted push response".into())))
    }

    fn pull(&self, request: &PullRequest) -> SyncResult<PullResponse<P>> {
        self.pull_requests.lock().push(request.clone());
        self.pull_responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(SyncError::Network("no scripted pull response".into())))
    }
}
