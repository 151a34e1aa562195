//! CSV adapter error types.

use std::path::PathBuf;

use autogov_domain::error::{GovernanceError, IngestError};

/// Errors specific to the CSV adapter.
#[derive(Debug, thiserror::Error)]
pub enum CsvError {
    /// The input is not well-formed delimited text.
    #[error("malformed CSV input")]
    Csv(#[from] csv::Error),

    /// A report file could not be created or written.
    #[error("failed to write {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured delimiter does not fit in a single byte.
    #[error("delimiter {0:?} must be a single ASCII character")]
    InvalidDelimiter(char),

    /// A domain-level error (missing columns, invalid field, etc.).
    #[error("domain error")]
    Domain(#[source] GovernanceError),
}

impl CsvError {
    /// Convert into a [`GovernanceError`] for propagation across port
    /// boundaries.
    #[must_use]
    pub fn into_domain(self) -> GovernanceError {
        match self {
            Self::Domain(err) => err,
            other => GovernanceError::Adapter(Box::new(other)),
        }
    }
}

impl From<IngestError> for CsvError {
    fn from(err: IngestError) -> Self {
        Self::Domain(err.into())
    }
}

impl From<GovernanceError> for CsvError {
    fn from(err: GovernanceError) -> Self {
        Self::Domain(err)
    }
}

impl From<CsvError> for GovernanceError {
    fn from(err: CsvError) -> Self {
        err.into_domain()
    }
}
