//! Request handling for the reference server.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::log::RecordLog;
use chartsync_protocol::{
    ProcessToken, PullRequest, PullResponse, PushRequest, PushResponse, RecordRejection,
};
use chartsync_store::SyncRecord;
use std::sync::Arc;
use tracing::debug;

type Validator<R> = Box<dyn Fn(&R) -> Vec<String> + Send + Sync>;

/// The reference sync server for one record type.
///
/// # Example
///
/// ```
/// use chartsync_server::{ServerConfig, SyncServer};
/// use chartsync_testkit::fixtures::{blood_pressure, BloodPressure};
/// use chartsync_protocol::PushRequest;
///
/// let server: SyncServer<BloodPressure> = SyncServer::new(ServerConfig::default());
/// let response = server
///     .handle_push(PushRequest::new(vec![blood_pressure(120, 80)]))
///     .unwrap();
/// assert!(response.is_fully_accepted());
/// ```
pub struct SyncServer<R: SyncRecord> {
    config: ServerConfig,
    log: Arc<RecordLog<R>>,
    validator: Option<Validator<R>>,
}

impl<R: SyncRecord> SyncServer<R> {
    /// Creates a server with an empty log.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_log(config, Arc::new(RecordLog::new()))
    }

    /// Creates a server over an existing log.
    pub fn with_log(config: ServerConfig, log: Arc<RecordLog<R>>) -> Self {
        Self {
            config,
            log,
            validator: None,
        }
    }

    /// Installs a per-record validator. Records for which it returns a
    /// non-empty error list are rejected by name; the rest of the batch is
    /// accepted.
    pub fn with_validator(
        mut self,
        validator: impl Fn(&R) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.validator = Some(Box::new(validator));
        self
    }

    /// Handles a push request.
    pub fn handle_push(&self, request: PushRequest<R>) -> ServerResult<PushResponse> {
        let mut errors = Vec::new();

        for record in request.records {
            if let Some(validator) = &self.validator {
                let field_errors = validator(&record);
                if !field_errors.is_empty() {
                    errors.push(RecordRejection::new(record.record_id(), field_errors));
                    continue;
                }
            }
            self.log.upsert(record);
        }

        if !errors.is_empty() {
            debug!(rejected = errors.len(), "push batch partially rejected");
        }

        Ok(PushResponse::with_errors(errors))
    }

    /// Handles a pull request.
    ///
    /// The issued token encodes the last log sequence the page covers; the
    /// client treats it as opaque and replays it verbatim.
    pub fn handle_pull(&self, request: PullRequest) -> ServerResult<PullResponse<R>> {
        let after = match &request.process_token {
            None => 0,
            Some(token) => token
                .as_str()
                .parse::<u64>()
                .map_err(|_| ServerError::InvalidToken(token.as_str().to_string()))?,
        };

        let limit = request.limit.min(self.config.max_page_size);
        let (records, last) = self.log.page_after(after, limit);

        Ok(PullResponse::new(records, ProcessToken::new(last.to_string())))
    }

    /// Number of live records in the log.
    pub fn record_count(&self) -> usize {
        self.log.len()
    }

    /// The underlying log.
    pub fn log(&self) -> &Arc<RecordLog<R>> {
        &self.log
    }
}
