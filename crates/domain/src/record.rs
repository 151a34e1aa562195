//! Automation record — one scheduled automation and its 30-day run history.

use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, ValidationError};
use crate::time::Timestamp;

/// Raw fields of one automation as supplied by the ingestion layer.
///
/// Names are not unique: two rows may describe different automations that
/// share a name. Derived values live in
/// [`DerivedMetrics`](crate::metrics::DerivedMetrics), never here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutomationRecord {
    pub name: String,
    pub business_unit: Option<String>,
    pub created_date: Option<Timestamp>,
    pub last_run_time: Option<Timestamp>,
    pub scheduled_frequency: Option<String>,
    pub run_30d_count: u64,
    pub error_30d_count: u64,
    pub skip_30d_count: u64,
    pub completion_30d_count: u64,
    /// Fraction in `[0, 1]`.
    pub success_rate_30d: Option<f64>,
    pub run_duration_minutes: Option<f64>,
}

impl AutomationRecord {
    /// Create a builder for constructing an [`AutomationRecord`].
    #[must_use]
    pub fn builder() -> AutomationRecordBuilder {
        AutomationRecordBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Validation`] when:
    /// - `success_rate_30d` is not a finite value in `[0, 1]`
    ///   ([`ValidationError::SuccessRateOutOfRange`])
    /// - `run_duration_minutes` is negative or not finite
    ///   ([`ValidationError::NegativeDuration`])
    pub fn validate(&self) -> Result<(), GovernanceError> {
        if let Some(rate) = self.success_rate_30d
            && !(0.0..=1.0).contains(&rate)
        {
            return Err(ValidationError::SuccessRateOutOfRange(rate).into());
        }
        if let Some(minutes) = self.run_duration_minutes
            && !(minutes.is_finite() && minutes >= 0.0)
        {
            return Err(ValidationError::NegativeDuration(minutes).into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`AutomationRecord`].
#[derive(Debug, Default)]
pub struct AutomationRecordBuilder {
    name: Option<String>,
    business_unit: Option<String>,
    created_date: Option<Timestamp>,
    last_run_time: Option<Timestamp>,
    scheduled_frequency: Option<String>,
    run_30d_count: u64,
    error_30d_count: u64,
    skip_30d_count: u64,
    completion_30d_count: u64,
    success_rate_30d: Option<f64>,
    run_duration_minutes: Option<f64>,
}

impl AutomationRecordBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn business_unit(mut self, business_unit: impl Into<String>) -> Self {
        self.business_unit = Some(business_unit.into());
        self
    }

    #[must_use]
    pub fn created_date(mut self, ts: Timestamp) -> Self {
        self.created_date = Some(ts);
        self
    }

    #[must_use]
    pub fn last_run_time(mut self, ts: Timestamp) -> Self {
        self.last_run_time = Some(ts);
        self
    }

    #[must_use]
    pub fn scheduled_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.scheduled_frequency = Some(frequency.into());
        self
    }

    /// Set the four 30-day counters at once: runs, errors, skips, completions.
    #[must_use]
    pub fn counts(mut self, runs: u64, errors: u64, skips: u64, completions: u64) -> Self {
        self.run_30d_count = runs;
        self.error_30d_count = errors;
        self.skip_30d_count = skips;
        self.completion_30d_count = completions;
        self
    }

    #[must_use]
    pub fn success_rate_30d(mut self, rate: f64) -> Self {
        self.success_rate_30d = Some(rate);
        self
    }

    #[must_use]
    pub fn run_duration_minutes(mut self, minutes: f64) -> Self {
        self.run_duration_minutes = Some(minutes);
        self
    }

    /// Consume the builder, validate, and return an [`AutomationRecord`].
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Validation`] if a fractional field is out of range.
    pub fn build(self) -> Result<AutomationRecord, GovernanceError> {
        let record = AutomationRecord {
            name: self.name.unwrap_or_default(),
            business_unit: self.business_unit,
            created_date: self.created_date,
            last_run_time: self.last_run_time,
            scheduled_frequency: self.scheduled_frequency,
            run_30d_count: self.run_30d_count,
            error_30d_count: self.error_30d_count,
            skip_30d_count: self.skip_30d_count,
            completion_30d_count: self.completion_30d_count,
            success_rate_30d: self.success_rate_30d,
            run_duration_minutes: self.run_duration_minutes,
        };
        record.validate()?;
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn should_build_record_with_defaults() {
        let record = AutomationRecord::builder().name("Invoice Sync").build().unwrap();
        assert_eq!(record.name, "Invoice Sync");
        assert!(record.business_unit.is_none());
        assert!(record.last_run_time.is_none());
        assert_eq!(record.run_30d_count, 0);
        assert!(record.success_rate_30d.is_none());
    }

    #[test]
    fn should_set_counts_in_order() {
        let record = AutomationRecord::builder()
            .name("Payroll Job")
            .counts(40, 3, 2, 35)
            .build()
            .unwrap();
        assert_eq!(record.run_30d_count, 40);
        assert_eq!(record.error_30d_count, 3);
        assert_eq!(record.skip_30d_count, 2);
        assert_eq!(record.completion_30d_count, 35);
    }

    #[test]
    fn should_reject_success_rate_above_one() {
        let result = AutomationRecord::builder()
            .name("Bad")
            .success_rate_30d(1.5)
            .build();
        assert!(matches!(
            result,
            Err(GovernanceError::Validation(
                ValidationError::SuccessRateOutOfRange(_)
            ))
        ));
    }

    #[test]
    fn should_reject_nan_success_rate() {
        let result = AutomationRecord::builder()
            .name("Bad")
            .success_rate_30d(f64::NAN)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn should_reject_negative_duration() {
        let result = AutomationRecord::builder()
            .name("Bad")
            .run_duration_minutes(-1.0)
            .build();
        assert!(matches!(
            result,
            Err(GovernanceError::Validation(ValidationError::NegativeDuration(_)))
        ));
    }

    #[test]
    fn should_roundtrip_through_serde_json() {
        let record = AutomationRecord::builder()
            .name("Nightly Export")
            .business_unit("Finance")
            .last_run_time(Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap())
            .scheduled_frequency("Daily, 02:00")
            .success_rate_30d(0.9)
            .build()
            .unwrap();
        let json = serde_json::to_string(&record).unwrap();
        let parsed: AutomationRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
