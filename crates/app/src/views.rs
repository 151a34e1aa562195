//! Report views — the derived tables a governance report is made of.
//!
//! Every function is pure and preserves input order unless it says otherwise.

use std::collections::{BTreeMap, HashMap, HashSet};

use autogov_domain::action::SuggestedAction;
use autogov_domain::assessment::AssessedAutomation;
use autogov_domain::metrics::AgeGroup;
use autogov_domain::policy::GovernancePolicy;
use chrono::Timelike;
use serde::Serialize;

/// Records sharing their rounded run hour with at least one other record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClashingView {
    /// Sorted by rounded run time; ties keep input order.
    pub records: Vec<AssessedAutomation>,
    pub unique_names: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgeGroupCount {
    pub age_group: AgeGroup,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionCount {
    pub action: SuggestedAction,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub count: usize,
}

/// Schedules containing the high-frequency marker, active or not.
#[must_use]
pub fn high_frequency(
    assessed: &[AssessedAutomation],
    policy: &GovernancePolicy,
) -> Vec<AssessedAutomation> {
    assessed
        .iter()
        .filter(|item| policy.is_high_frequency(item.record.scheduled_frequency.as_deref()))
        .cloned()
        .collect()
}

/// Everything not classified as [`SuggestedAction::Keep`].
#[must_use]
pub fn flagged(assessed: &[AssessedAutomation]) -> Vec<AssessedAutomation> {
    assessed
        .iter()
        .filter(|item| item.suggested_action.is_flagged())
        .cloned()
        .collect()
}

#[must_use]
pub fn clashing(assessed: &[AssessedAutomation]) -> ClashingView {
    let mut per_slot: HashMap<_, usize> = HashMap::new();
    for slot in assessed.iter().filter_map(|item| item.metrics.rounded_run_time) {
        *per_slot.entry(slot).or_default() += 1;
    }

    let mut records: Vec<AssessedAutomation> = assessed
        .iter()
        .filter(|item| {
            item.metrics
                .rounded_run_time
                .is_some_and(|slot| per_slot.get(&slot).copied().unwrap_or(0) > 1)
        })
        .cloned()
        .collect();
    records.sort_by_key(|item| item.metrics.rounded_run_time);

    let unique_names = records
        .iter()
        .map(AssessedAutomation::name)
        .collect::<HashSet<_>>()
        .len();
    ClashingView {
        records,
        unique_names,
    }
}

/// The `limit` highest defined error rates, highest first.
#[must_use]
pub fn top_error_prone(assessed: &[AssessedAutomation], limit: usize) -> Vec<AssessedAutomation> {
    let mut with_rate: Vec<&AssessedAutomation> = assessed
        .iter()
        .filter(|item| item.metrics.error_rate.is_some())
        .collect();
    with_rate.sort_by(|a, b| {
        let (a, b) = (a.metrics.error_rate, b.metrics.error_rate);
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
    with_rate.into_iter().take(limit).cloned().collect()
}

/// Count per age bin, every bin listed, youngest first.
#[must_use]
pub fn age_distribution(assessed: &[AssessedAutomation]) -> Vec<AgeGroupCount> {
    AgeGroup::ALL
        .into_iter()
        .map(|age_group| AgeGroupCount {
            age_group,
            count: assessed
                .iter()
                .filter(|item| item.metrics.age_group == Some(age_group))
                .count(),
        })
        .collect()
}

/// Count per action, most frequent first; ties follow cascade order.
#[must_use]
pub fn action_breakdown(assessed: &[AssessedAutomation]) -> Vec<ActionCount> {
    let mut counts: Vec<ActionCount> = SuggestedAction::ALL
        .into_iter()
        .map(|action| ActionCount {
            action,
            count: assessed
                .iter()
                .filter(|item| item.suggested_action == action)
                .count(),
        })
        .filter(|entry| entry.count > 0)
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Last-run count per hour of day (UTC), for hours that occur.
#[must_use]
pub fn rush_hours(assessed: &[AssessedAutomation]) -> Vec<HourCount> {
    let mut per_hour: BTreeMap<u32, usize> = BTreeMap::new();
    for last_run in assessed.iter().filter_map(|item| item.record.last_run_time) {
        *per_hour.entry(last_run.hour()).or_default() += 1;
    }
    per_hour
        .into_iter()
        .map(|(hour, count)| HourCount { hour, count })
        .collect()
}

/// Runs long enough to risk a timeout. Records without a duration are skipped.
#[must_use]
pub fn timeout_risk(
    assessed: &[AssessedAutomation],
    policy: &GovernancePolicy,
) -> Vec<AssessedAutomation> {
    assessed
        .iter()
        .filter(|item| {
            item.record
                .run_duration_minutes
                .is_some_and(|minutes| minutes >= policy.timeout_risk_minutes)
        })
        .cloned()
        .collect()
}
