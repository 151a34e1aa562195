//! Governance report — everything handed to the presentation and export layer.

use autogov_domain::assessment::AssessedAutomation;
use autogov_domain::error::GovernanceError;
use autogov_domain::policy::{self, DEFAULT_SIMILARITY_THRESHOLD, GovernancePolicy};
use autogov_domain::similarity::{self, ClusteringMode, ScorerKind, SimilarityGroup};
use autogov_domain::summary::{self, BusinessUnitSummary};
use autogov_domain::time::Timestamp;
use serde::Serialize;

use crate::views::{self, ActionCount, AgeGroupCount, ClashingView, HourCount};

/// How many error-prone automations the report ranks.
pub const TOP_ERROR_PRONE_LIMIT: usize = 10;

/// Knobs for one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSettings {
    pub policy: GovernancePolicy,
    pub similarity_threshold: f64,
    pub scorer: ScorerKind,
    pub clustering_mode: ClusteringMode,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            policy: GovernancePolicy::default(),
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            scorer: ScorerKind::default(),
            clustering_mode: ClusteringMode::default(),
        }
    }
}

impl ReportSettings {
    /// Validate the policy and the similarity threshold.
    ///
    /// # Errors
    ///
    /// Returns [`GovernanceError::Validation`] on the first out-of-range value.
    pub fn validate(&self) -> Result<(), GovernanceError> {
        self.policy.validate()?;
        policy::check_fraction("similarity_threshold", self.similarity_threshold)
    }
}

/// The three core artifacts plus the derived views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GovernanceReport {
    pub generated_at: Timestamp,
    pub automations: Vec<AssessedAutomation>,
    pub similarity_groups: Vec<SimilarityGroup>,
    pub business_units: Vec<BusinessUnitSummary>,
    pub high_frequency: Vec<AssessedAutomation>,
    pub flagged: Vec<AssessedAutomation>,
    pub clashing: ClashingView,
    pub top_error_prone: Vec<AssessedAutomation>,
    pub age_distribution: Vec<AgeGroupCount>,
    pub action_breakdown: Vec<ActionCount>,
    pub rush_hours: Vec<HourCount>,
    pub timeout_risk: Vec<AssessedAutomation>,
}

impl GovernanceReport {
    /// Cluster, aggregate and build every view over an assessed collection.
    #[must_use]
    pub fn build(
        automations: Vec<AssessedAutomation>,
        settings: &ReportSettings,
        generated_at: Timestamp,
    ) -> Self {
        let policy = &settings.policy;
        let similarity_groups = similarity::cluster_with(
            settings.clustering_mode,
            automations.iter().map(AssessedAutomation::name),
            &settings.scorer,
            settings.similarity_threshold,
        );

        Self {
            generated_at,
            similarity_groups,
            business_units: summary::summarize_by_business_unit(&automations),
            high_frequency: views::high_frequency(&automations, policy),
            flagged: views::flagged(&automations),
            clashing: views::clashing(&automations),
            top_error_prone: views::top_error_prone(&automations, TOP_ERROR_PRONE_LIMIT),
            age_distribution: views::age_distribution(&automations),
            action_breakdown: views::action_breakdown(&automations),
            rush_hours: views::rush_hours(&automations),
            timeout_risk: views::timeout_risk(&automations, policy),
            automations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_default_settings() {
        assert!(ReportSettings::default().validate().is_ok());
    }

    #[test]
    fn should_reject_similarity_threshold_above_one() {
        let settings = ReportSettings {
            similarity_threshold: 1.5,
            ..ReportSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn should_serialize_labels_verbatim() {
        use autogov_domain::record::AutomationRecord;
        use chrono::{TimeZone, Utc};

        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let settings = ReportSettings::default();
        let record = AutomationRecord::builder().name("Idle").build().unwrap();
        let assessed = vec![AssessedAutomation::assess(record, &settings.policy, now)];
        let report = GovernanceReport::build(assessed, &settings, now);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["automations"][0]["suggested_action"], "No Run History");
        assert_eq!(json["action_breakdown"][0]["count"], 1);
        assert_eq!(json["age_distribution"][0]["age_group"], "<1 mo");
        assert_eq!(json["clashing"]["unique_names"], 0);
    }
}
