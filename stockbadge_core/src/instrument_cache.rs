//! Process-wide symbol → instrument identifier cache.
//!
//! Identifiers are stable for a page's lifetime, so entries have no TTL;
//! the cache is cleared only by process restart. The handle is cheap to
//! clone and safe to share across concurrently resolving placeholders.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, Default)]
pub struct InstrumentCache {
    inner: Arc<RwLock<HashMap<String, String>>>,
}

impl InstrumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(symbol: &str) -> String {
        symbol.trim().to_uppercase()
    }

    /// Look up the cached identifier for a symbol.
    pub async fn get(&self, symbol: &str) -> Option<String> {
        self.inner.read().await.get(&Self::key(symbol)).cloned()
    }

    /// Record the identifier resolved for a symbol.
    pub async fn insert(&self, symbol: &str, instrument_id: &str) {
        self.inner
            .write()
            .await
            .insert(Self::key(symbol), instrument_id.to_string());
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
