//! Action classifier — the ordered rule cascade that picks one suggested action.
//!
//! Rules are evaluated top to bottom and the first match wins; later rules
//! are never consulted. Existence-of-data checks come before rate checks,
//! which come before volume checks, so a record is never flagged for two
//! contradictory reasons. [`SuggestedAction::Keep`] is the fallback.

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::metrics::DerivedMetrics;
use crate::policy::GovernancePolicy;
use crate::record::AutomationRecord;
use crate::time::Timestamp;

/// The recommendation attached to every assessed automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestedAction {
    #[serde(rename = "Created But Never Run")]
    CreatedButNeverRun,
    #[serde(rename = "Stale – Consider Archiving")]
    Stale,
    #[serde(rename = "No Run History")]
    NoRunHistory,
    #[serde(rename = "Inactive")]
    Inactive,
    #[serde(rename = "Error-Prone")]
    ErrorProne,
    #[serde(rename = "Review High Frequency")]
    ReviewHighFrequency,
    #[serde(rename = "Inefficient")]
    Inefficient,
    #[serde(rename = "Excessive Annual Volume")]
    ExcessiveAnnualVolume,
    #[serde(rename = "Keep")]
    Keep,
}

impl SuggestedAction {
    /// Every action, in cascade order.
    pub const ALL: [Self; 9] = [
        Self::CreatedButNeverRun,
        Self::Stale,
        Self::NoRunHistory,
        Self::Inactive,
        Self::ErrorProne,
        Self::ReviewHighFrequency,
        Self::Inefficient,
        Self::ExcessiveAnnualVolume,
        Self::Keep,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::CreatedButNeverRun => "Created But Never Run",
            Self::Stale => "Stale – Consider Archiving",
            Self::NoRunHistory => "No Run History",
            Self::Inactive => "Inactive",
            Self::ErrorProne => "Error-Prone",
            Self::ReviewHighFrequency => "Review High Frequency",
            Self::Inefficient => "Inefficient",
            Self::ExcessiveAnnualVolume => "Excessive Annual Volume",
            Self::Keep => "Keep",
        }
    }

    /// Position in the cascade; lower fires first.
    #[must_use]
    pub fn priority(self) -> usize {
        Self::ALL
            .iter()
            .position(|action| *action == self)
            .unwrap_or(Self::ALL.len())
    }

    /// Whether this action asks for human attention.
    #[must_use]
    pub fn is_flagged(self) -> bool {
        self != Self::Keep
    }
}

impl std::fmt::Display for SuggestedAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when parsing an unknown action label.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("unknown suggested action {0:?}")]
pub struct UnknownAction(pub String);

impl std::str::FromStr for SuggestedAction {
    type Err = UnknownAction;

    /// Accepts the display label, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|action| action.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownAction(s.to_string()))
    }
}

/// Everything a rule may look at.
#[derive(Debug, Clone, Copy)]
pub struct RuleInput<'a> {
    pub record: &'a AutomationRecord,
    pub metrics: &'a DerivedMetrics,
    pub policy: &'a GovernancePolicy,
    pub now: Timestamp,
}

/// One cascade step: the action produced when `matches` holds.
#[derive(Clone, Copy)]
pub struct Rule {
    pub action: SuggestedAction,
    pub matches: fn(&RuleInput<'_>) -> bool,
}

/// The cascade, highest priority first. [`SuggestedAction::Keep`] is implicit.
pub const CASCADE: [Rule; 8] = [
    Rule {
        action: SuggestedAction::CreatedButNeverRun,
        matches: created_but_never_run,
    },
    Rule {
        action: SuggestedAction::Stale,
        matches: stale,
    },
    Rule {
        action: SuggestedAction::NoRunHistory,
        matches: no_run_history,
    },
    Rule {
        action: SuggestedAction::Inactive,
        matches: inactive,
    },
    Rule {
        action: SuggestedAction::ErrorProne,
        matches: error_prone,
    },
    Rule {
        action: SuggestedAction::ReviewHighFrequency,
        matches: review_high_frequency,
    },
    Rule {
        action: SuggestedAction::Inefficient,
        matches: inefficient,
    },
    Rule {
        action: SuggestedAction::ExcessiveAnnualVolume,
        matches: excessive_annual_volume,
    },
];

/// Pick the first matching action from [`CASCADE`], or `Keep`.
#[must_use]
pub fn classify(
    record: &AutomationRecord,
    metrics: &DerivedMetrics,
    policy: &GovernancePolicy,
    now: Timestamp,
) -> SuggestedAction {
    let input = RuleInput {
        record,
        metrics,
        policy,
        now,
    };
    CASCADE
        .iter()
        .find(|rule| (rule.matches)(&input))
        .map_or(SuggestedAction::Keep, |rule| rule.action)
}

fn created_but_never_run(input: &RuleInput<'_>) -> bool {
    let cutoff = TimeDelta::try_days(input.policy.never_run_grace_days)
        .and_then(|grace| input.now.checked_sub_signed(grace));
    match (cutoff, input.record.created_date) {
        (Some(cutoff), Some(created)) => input.metrics.has_never_run && created < cutoff,
        _ => false,
    }
}

fn stale(input: &RuleInput<'_>) -> bool {
    input
        .metrics
        .last_run_age_days
        .is_some_and(|age| age > input.policy.stale_after_days)
}

fn no_run_history(input: &RuleInput<'_>) -> bool {
    input.record.last_run_time.is_none()
}

fn inactive(input: &RuleInput<'_>) -> bool {
    input.record.run_30d_count == 0
}

fn error_prone(input: &RuleInput<'_>) -> bool {
    input
        .metrics
        .error_rate
        .is_some_and(|rate| rate > input.policy.error_rate_threshold)
}

// Frequency only matters for jobs that are still running.
fn review_high_frequency(input: &RuleInput<'_>) -> bool {
    input.metrics.is_active
        && input
            .policy
            .is_high_frequency(input.record.scheduled_frequency.as_deref())
}

fn inefficient(input: &RuleInput<'_>) -> bool {
    input
        .metrics
        .efficiency_score
        .is_some_and(|score| score < input.policy.efficiency_threshold)
        && input.record.run_30d_count > input.policy.inefficient_min_runs
}

fn excessive_annual_volume(input: &RuleInput<'_>) -> bool {
    input.metrics.annualized_run_count > input.policy.annual_volume_threshold
}
