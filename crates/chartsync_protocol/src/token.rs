//! Opaque pull resume tokens.

use serde::{Deserialize, Serialize};

/// A server-issued resume point for the paginated pull stream.
///
/// The token is opaque to the client: it is persisted verbatim after a page
/// is durably merged and replayed on the next pull request. Servers are free
/// to encode a sequence number, a timestamp, or anything else in it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessToken(String);

impl ProcessToken {
    /// Wraps a raw token value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw token value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for ProcessToken {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ProcessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
