//! Persisted pull cursor.

use chartsync_protocol::ProcessToken;
use chartsync_store::StoreResult;
use parking_lot::RwLock;

/// Persistence for one record type's pull resume token.
///
/// The pull pipeline is the only writer. The stored value means "everything
/// the server had up to this point has been durably merged"; it is advanced
/// only after the corresponding page's merge transaction committed, never
/// optimistically.
pub trait CursorStore: Send + Sync {
    /// Returns the persisted token, or `None` before the first completed
    /// page (full initial sync).
    fn load(&self) -> StoreResult<Option<ProcessToken>>;

    /// Persists a token verbatim.
    fn save(&self, token: &ProcessToken) -> StoreResult<()>;
}

/// An in-memory cursor store.
#[derive(Debug, Default)]
pub struct MemoryCursorStore {
    token: RwLock<Option<ProcessToken>>,
}

impl MemoryCursorStore {
    /// Creates an empty cursor store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl CursorStore for MemoryCursorStore {
    fn load(&self) -> StoreResult<Option<ProcessToken>> {
        Ok(self.token.read().clone())
    }

    fn save(&self, token: &ProcessToken) -> StoreResult<()> {
        *self.token.write() = Some(token.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_absent() {
        let cursor = MemoryCursorStore::new();
        assert_eq!(cursor.load().unwrap(), None);
    }

    #[test]
    fn stores_tokens_verbatim() {
        let cursor = MemoryCursorStore::new();

        cursor.save(&ProcessToken::new("opaque-17")).unwrap();
        assert_eq!(cursor.load().unwrap(), Some(ProcessToken::new("opaque-17")));

        cursor.save(&ProcessToken::new("opaque-18")).unwrap();
        assert_eq!(cursor.load().unwrap(), Some(ProcessToken::new("opaque-18")));
    }
}
