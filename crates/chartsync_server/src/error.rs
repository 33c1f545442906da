//! Error types for the reference server.

use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors the reference server can report.
#[derive(Error, Debug)]
pub enum ServerError {
    /// The pull request carried a token this server did not issue.
    #[error("unrecognized process token: {0}")]
    InvalidToken(String),

    /// The request is malformed.
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ServerError::InvalidToken("not-a-cursor".into());
        assert!(err.to_string().contains("not-a-cursor"));
    }
}
