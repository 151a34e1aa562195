//! Report sink port — export of a finished governance report.

use autogov_domain::error::GovernanceError;

use crate::report::GovernanceReport;

/// Consumes a [`GovernanceReport`] (writes files, renders output, …).
pub trait ReportSink {
    /// Export `report`.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Adapter`] when the export target fails.
    fn write(&self, report: &GovernanceReport) -> Result<(), GovernanceError>;
}

