//! Ingestion cache — parsed records memoized by the content hash of the raw input.
//!
//! Only the parse is cached. Derived metrics depend on the reference time
//! and are recomputed for every analysis. The cache holds a single entry:
//! any input with a different hash evicts it.

use std::sync::Arc;

use autogov_domain::error::GovernanceError;
use autogov_domain::record::AutomationRecord;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of a raw input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentHash(String);

impl ContentHash {
    #[must_use]
    pub fn of(raw: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(raw);
        Self(format!("{:x}", hasher.finalize()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-entry memo of the last successfully parsed input.
#[derive(Debug, Default)]
pub struct IngestionCache {
    entry: Option<(ContentHash, Arc<Vec<AutomationRecord>>)>,
    hits: u64,
    misses: u64,
}

impl IngestionCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached records for `raw`, or parse them with `load`.
    ///
    /// A new hash invalidates the previous entry before `load` runs, so a
    /// failed load leaves the cache empty.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `load`.
    pub fn get_or_load<F>(
        &mut self,
        raw: &[u8],
        load: F,
    ) -> Result<Arc<Vec<AutomationRecord>>, GovernanceError>
    where
        F: FnOnce(&[u8]) -> Result<Vec<AutomationRecord>, GovernanceError>,
    {
        let key = ContentHash::of(raw);
        if let Some((cached_key, records)) = &self.entry
            && *cached_key == key
        {
            self.hits += 1;
            tracing::debug!(hash = %key, "ingestion cache hit");
            return Ok(Arc::clone(records));
        }

        self.misses += 1;
        self.entry = None;
        tracing::debug!(hash = %key, "ingestion cache miss");
        let records = Arc::new(load(raw)?);
        self.entry = Some((key, Arc::clone(&records)));
        Ok(records)
    }

    /// Drop the cached entry.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Hash of the input currently cached, if any.
    #[must_use]
    pub fn key(&self) -> Option<&ContentHash> {
        self.entry.as_ref().map(|(key, _)| key)
    }

    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }
}
