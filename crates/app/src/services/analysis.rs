//! Analysis service — the governance pipeline use case.
//!
//! raw bytes → [`RecordSource`] (memoized by content hash) → metrics and
//! action per record → filter → clusters, rollups and views.

use std::sync::{Mutex, PoisonError};

use autogov_domain::assessment;
use autogov_domain::error::{GovernanceError, IngestError};
use autogov_domain::time::Timestamp;

use crate::cache::IngestionCache;
use crate::filter::RecordFilter;
use crate::ports::{RecordSource, ReportSink};
use crate::report::{GovernanceReport, ReportSettings};

/// Application service running the whole analysis for one input.
pub struct AnalysisService<S> {
    source: S,
    settings: ReportSettings,
    cache: Mutex<IngestionCache>,
}

impl<S: RecordSource> AnalysisService<S> {
    /// Create a new service reading records through `source`.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Validation`] if `settings` are out of range.
    pub fn new(source: S, settings: ReportSettings) -> Result<Self, GovernanceError> {
        settings.validate()?;
        Ok(Self {
            source,
            settings,
            cache: Mutex::new(IngestionCache::new()),
        })
    }

    /// Run the pipeline over `raw` as of `now`, keeping only what `filter` matches.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Ingest`] when the input is unusable (missing
    /// columns, no rows); nothing is computed in that case.
    #[tracing::instrument(skip(self, raw, filter), fields(bytes = raw.len()))]
    pub fn analyze(
        &self,
        raw: &[u8],
        now: Timestamp,
        filter: &RecordFilter,
    ) -> Result<GovernanceReport, GovernanceError> {
        let records = {
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            cache.get_or_load(raw, |bytes| self.source.read(bytes))?
        };
        if records.is_empty() {
            return Err(IngestError::Empty.into());
        }

        let assessed = assessment::assess_all(Vec::clone(&records), &self.settings.policy, now);
        let assessed = filter.apply(assessed);
        tracing::info!(
            records = records.len(),
            selected = assessed.len(),
            "automations assessed"
        );

        let report = GovernanceReport::build(assessed, &self.settings, now);
        tracing::info!(
            flagged = report.flagged.len(),
            similarity_groups = report.similarity_groups.len(),
            business_units = report.business_units.len(),
            "governance report built"
        );
        Ok(report)
    }

    /// Run [`analyze`](Self::analyze) and hand the result to every sink, in order.
    ///
    /// # Errors
    ///
    /// Returns the analysis error, or the first sink failure.
    pub fn analyze_and_export(
        &self,
        raw: &[u8],
        now: Timestamp,
        filter: &RecordFilter,
        sinks: &[&dyn ReportSink],
    ) -> Result<GovernanceReport, GovernanceError> {
        let report = self.analyze(raw, now, filter)?;
        for sink in sinks {
            sink.write(&report)?;
        }
        Ok(report)
    }

    /// Forget the cached parse.
    pub fn invalidate_cache(&self) {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .invalidate();
    }

    /// `(hits, misses)` of the ingestion cache.
    #[must_use]
    pub fn cache_stats(&self) -> (u64, u64) {
        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        (cache.hits(), cache.misses())
    }
}
