//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`GovernanceError`] via `#[from]` (or `into_domain` for adapters).

/// Top-level error for every fallible autogov operation.
#[derive(Debug, thiserror::Error)]
pub enum GovernanceError {
    /// The input collection could not be turned into records.
    #[error("ingestion error")]
    Ingest(#[from] IngestError),

    /// A domain value violates its invariants.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// An adapter (reader, writer) failed for a reason of its own.
    #[error("adapter error")]
    Adapter(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Why an input collection was rejected as a whole.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IngestError {
    /// One or more required columns are absent from the header.
    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// The input has a header but no data rows.
    #[error("input contains no records")]
    Empty,

    /// A required numeric cell holds something other than a non-negative integer.
    #[error("row {row}: column {column} has invalid value {value:?}")]
    InvalidField {
        /// 1-based data row number (header excluded).
        row: usize,
        column: String,
        value: String,
    },
}

/// Domain invariant violations.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ValidationError {
    #[error("success rate must be a fraction in [0, 1], got {0}")]
    SuccessRateOutOfRange(f64),

    #[error("run duration must be a non-negative number of minutes, got {0}")]
    NegativeDuration(f64),

    #[error("{name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },

    #[error("{name} must be a non-negative number of days, got {value}")]
    NegativeDays { name: &'static str, value: i64 },

    #[error("timeout risk must be a finite, non-negative number of minutes, got {0}")]
    InvalidTimeoutMinutes(f64),

    #[error("high frequency marker must not be empty")]
    EmptyMarker,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_list_every_missing_column_in_message() {
        let err = IngestError::MissingColumns(vec!["CreatedDate".into(), "LastRunTime".into()]);
        assert_eq!(
            err.to_string(),
            "missing required column(s): CreatedDate, LastRunTime"
        );
    }

    #[test]
    fn should_convert_ingest_error_into_governance_error() {
        let err: GovernanceError = IngestError::Empty.into();
        assert!(matches!(err, GovernanceError::Ingest(IngestError::Empty)));
    }

    #[test]
    fn should_display_invalid_field_with_location() {
        let err = IngestError::InvalidField {
            row: 3,
            column: "30DayRunCount".into(),
            value: "-4".into(),
        };
        assert_eq!(
            err.to_string(),
            "row 3: column 30DayRunCount has invalid value \"-4\""
        );
    }

    #[test]
    fn should_convert_validation_error_into_governance_error() {
        let err: GovernanceError = ValidationError::EmptyMarker.into();
        assert!(matches!(
            err,
            GovernanceError::Validation(ValidationError::EmptyMarker)
        ));
    }
}
