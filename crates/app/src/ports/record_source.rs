//! Record source port — ingestion of raw input into records.

use autogov_domain::error::GovernanceError;
use autogov_domain::record::AutomationRecord;

/// Parses one raw input (an uploaded file, a byte buffer) into records.
///
/// Implementations fail fast on structural problems (missing columns, no
/// rows) and degrade unreadable cells to `None` instead of failing.
pub trait RecordSource {
    /// Parse every record in `raw`, in input order.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Ingest`] when the input cannot be used as a
    /// whole, or [`GovernanceError::Adapter`] for reader-specific failures.
    fn read(&self, raw: &[u8]) -> Result<Vec<AutomationRecord>, GovernanceError>;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    fn read(&self, raw: &[u8]) -> Result<Vec<AutomationRecord>, GovernanceError> {
        (**self).read(raw)
    }
}
