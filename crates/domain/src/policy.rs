//! Governance policy — the thresholds rules and views are evaluated against.

use serde::{Deserialize, Serialize};

use crate::error::{GovernanceError, ValidationError};

/// Last-run age (days) at or below which an automation counts as active.
pub const ACTIVE_WINDOW_DAYS: i64 = 30;

/// Default minimum similarity for two names to be grouped.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

/// Thresholds for the action cascade and the report views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernancePolicy {
    /// A never-run automation created longer ago than this is flagged.
    pub never_run_grace_days: i64,
    /// Last runs older than this are stale.
    pub stale_after_days: i64,
    /// Error rates strictly above this are error-prone.
    pub error_rate_threshold: f64,
    /// Efficiency strictly below this (with enough runs) is inefficient.
    pub efficiency_threshold: f64,
    /// Runs required, strictly more than, before efficiency is judged.
    pub inefficient_min_runs: u64,
    /// Annualized runs strictly above this are excessive.
    pub annual_volume_threshold: u64,
    /// Case-insensitive substring marking an hourly schedule.
    pub high_frequency_marker: String,
    /// Runs lasting at least this many minutes risk timing out.
    pub timeout_risk_minutes: f64,
}

impl Default for GovernancePolicy {
    fn default() -> Self {
        Self {
            never_run_grace_days: 90,
            stale_after_days: 180,
            error_rate_threshold: 0.5,
            efficiency_threshold: 0.5,
            inefficient_min_runs: 10,
            annual_volume_threshold: 50_000,
            high_frequency_marker: "every hour".to_string(),
            timeout_risk_minutes: 50.0,
        }
    }
}

impl GovernancePolicy {
    /// Check every threshold against its domain and that the marker is set.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Validation`] on the first violated bound.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        check_days("never_run_grace_days", self.never_run_grace_days)?;
        check_days("stale_after_days", self.stale_after_days)?;
        check_fraction("error_rate_threshold", self.error_rate_threshold)?;
        check_fraction("efficiency_threshold", self.efficiency_threshold)?;
        if !self.timeout_risk_minutes.is_finite() || self.timeout_risk_minutes < 0.0 {
            return Err(ValidationError::InvalidTimeoutMinutes(self.timeout_risk_minutes).into());
        }
        if self.high_frequency_marker.trim().is_empty() {
            return Err(ValidationError::EmptyMarker.into());
        }
        Ok(())
    }

    /// Whether a raw schedule text contains the high-frequency marker.
    #[must_use]
    pub fn is_high_frequency(&self, scheduled_frequency: Option<&str>) -> bool {
        scheduled_frequency.is_some_and(|text| {
            text.to_lowercase()
                .contains(&self.high_frequency_marker.to_lowercase())
        })
    }
}

/// Reject a threshold outside `[0, 1]`.
///
/// # Errors
///
/// Returns [`ValidationError::ThresholdOutOfRange`] wrapped in [`GovernanceError`].
pub fn check_fraction(name: &'static str, value: f64) -> Result<(), GovernanceError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ThresholdOutOfRange { name, value }.into())
    }
}

fn check_days(name: &'static str, value: i64) -> Result<(), GovernanceError> {
    if value < 0 {
        return Err(ValidationError::NegativeDays { name, value }.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_default_policy() {
        assert!(GovernancePolicy::default().validate().is_ok());
    }

    #[test]
    fn should_reject_error_threshold_above_one() {
        let policy = GovernancePolicy {
            error_rate_threshold: 1.2,
            ..GovernancePolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(GovernanceError::Validation(
                ValidationError::ThresholdOutOfRange {
                    name: "error_rate_threshold",
                    ..
                }
            ))
        ));
    }

    #[test]
    fn should_reject_negative_day_thresholds() {
        let policy = GovernancePolicy {
            stale_after_days: -1,
            ..GovernancePolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(GovernanceError::Validation(ValidationError::NegativeDays {
                name: "stale_after_days",
                value: -1
            }))
        ));

        let policy = GovernancePolicy {
            never_run_grace_days: -30,
            ..GovernancePolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn should_accept_zero_day_thresholds() {
        let policy = GovernancePolicy {
            never_run_grace_days: 0,
            stale_after_days: 0,
            ..GovernancePolicy::default()
        };
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn should_reject_non_finite_or_negative_timeout_minutes() {
        for minutes in [f64::NAN, f64::INFINITY, -5.0] {
            let policy = GovernancePolicy {
                timeout_risk_minutes: minutes,
                ..GovernancePolicy::default()
            };
            assert!(matches!(
                policy.validate(),
                Err(GovernanceError::Validation(
                    ValidationError::InvalidTimeoutMinutes(_)
                ))
            ));
        }
    }

    #[test]
    fn should_reject_blank_marker() {
        let policy = GovernancePolicy {
            high_frequency_marker: "  ".to_string(),
            ..GovernancePolicy::default()
        };
        assert!(matches!(
            policy.validate(),
            Err(GovernanceError::Validation(ValidationError::EmptyMarker))
        ));
    }

    #[test]
    fn should_match_marker_case_insensitively() {
        let policy = GovernancePolicy::default();
        assert!(policy.is_high_frequency(Some("Runs EVERY HOUR, weekdays")));
        assert!(!policy.is_high_frequency(Some("Every 2 hours")));
        assert!(!policy.is_high_frequency(None));
    }

    #[test]
    fn should_fill_missing_fields_with_defaults_when_deserializing() {
        let policy: GovernancePolicy =
            serde_json::from_str(r#"{"stale_after_days": 365}"#).unwrap();
        assert_eq!(policy.stale_after_days, 365);
        assert_eq!(policy.never_run_grace_days, 90);
    }
}
