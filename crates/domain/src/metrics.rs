//! Metrics deriver — age, activity, rate and volume facts computed from raw fields.
//!
//! Every value here is a pure function of one [`AutomationRecord`] and the
//! reference time. Missing inputs propagate as `None`; they are never
//! coerced to zero or to a sentinel, because "never ran" and "ran long ago"
//! lead to different actions downstream.

use serde::{Deserialize, Serialize};

use crate::policy::ACTIVE_WINDOW_DAYS;
use crate::record::AutomationRecord;
use crate::time::{self, Timestamp};

/// Schedule group used when an automation has no schedule text.
pub const BLANK_SCHEDULE: &str = "Blank";

/// Runs in a 30-day window multiplied by this give the yearly estimate.
const MONTHS_PER_YEAR: u64 = 12;

/// How long ago an automation last ran, in ordered bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeGroup {
    #[serde(rename = "<1 mo")]
    UnderOneMonth,
    #[serde(rename = "1–3 mo")]
    OneToThreeMonths,
    #[serde(rename = "3–6 mo")]
    ThreeToSixMonths,
    #[serde(rename = "6–12 mo")]
    SixToTwelveMonths,
    #[serde(rename = ">1 yr")]
    OverOneYear,
}

impl AgeGroup {
    /// All bins, youngest first.
    pub const ALL: [Self; 5] = [
        Self::UnderOneMonth,
        Self::OneToThreeMonths,
        Self::ThreeToSixMonths,
        Self::SixToTwelveMonths,
        Self::OverOneYear,
    ];

    /// Bin an age in days. Each bin is closed at its upper cut point.
    #[must_use]
    pub fn from_age_days(days: i64) -> Self {
        match days {
            i64::MIN..=30 => Self::UnderOneMonth,
            31..=90 => Self::OneToThreeMonths,
            91..=180 => Self::ThreeToSixMonths,
            181..=365 => Self::SixToTwelveMonths,
            _ => Self::OverOneYear,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::UnderOneMonth => "<1 mo",
            Self::OneToThreeMonths => "1–3 mo",
            Self::ThreeToSixMonths => "3–6 mo",
            Self::SixToTwelveMonths => "6–12 mo",
            Self::OverOneYear => ">1 yr",
        }
    }
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Facts derived from one record. Never supplied by input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub last_run_age_days: Option<i64>,
    pub is_active: bool,
    pub has_never_run: bool,
    pub age_group: Option<AgeGroup>,
    pub schedule_group: String,
    pub error_rate: Option<f64>,
    pub skip_rate: Option<f64>,
    pub efficiency_score: Option<f64>,
    pub annualized_run_count: u64,
    pub rounded_run_time: Option<Timestamp>,
}

/// Compute every derived metric for `record` as of `now`.
#[must_use]
pub fn derive(record: &AutomationRecord, now: Timestamp) -> DerivedMetrics {
    let last_run_age_days = record
        .last_run_time
        .map(|last_run| time::days_between(last_run, now));

    DerivedMetrics {
        last_run_age_days,
        is_active: last_run_age_days.is_some_and(|age| age <= ACTIVE_WINDOW_DAYS),
        has_never_run: record.last_run_time.is_none(),
        age_group: last_run_age_days.map(AgeGroup::from_age_days),
        schedule_group: schedule_group(record.scheduled_frequency.as_deref()),
        error_rate: ratio(record.error_30d_count, record.run_30d_count),
        skip_rate: ratio(record.skip_30d_count, record.run_30d_count),
        efficiency_score: ratio(record.completion_30d_count, record.run_30d_count),
        annualized_run_count: record.run_30d_count.saturating_mul(MONTHS_PER_YEAR),
        rounded_run_time: record.last_run_time.and_then(time::round_to_hour),
    }
}

/// First comma-separated token of the schedule text, trimmed.
///
/// Absent or blank text maps to [`BLANK_SCHEDULE`].
#[must_use]
pub fn schedule_group(scheduled_frequency: Option<&str>) -> String {
    scheduled_frequency
        .and_then(|text| text.split(',').next())
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map_or_else(|| BLANK_SCHEDULE.to_string(), str::to_string)
}

/// Guarded division for 30-day rates.
///
/// `None` when the denominator is zero. Counts that exceed the run count
/// are inconsistent input and clamp to `1.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn ratio(numerator: u64, denominator: u64) -> Option<f64> {
    if denominator == 0 {
        return None;
    }
    Some((numerator as f64 / denominator as f64).min(1.0))
}
