//! Assessed automation — a record with its derived metrics and suggested action.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::action::{self, SuggestedAction};
use crate::metrics::{self, DerivedMetrics};
use crate::policy::GovernancePolicy;
use crate::record::AutomationRecord;
use crate::time::Timestamp;

/// One automation after the deriver and the classifier have run.
///
/// Raw fields are kept untouched in `record`; everything computed sits
/// next to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessedAutomation {
    pub record: AutomationRecord,
    pub metrics: DerivedMetrics,
    pub suggested_action: SuggestedAction,
}

impl AssessedAutomation {
    /// Derive metrics for `record` and classify it.
    #[must_use]
    pub fn assess(record: AutomationRecord, policy: &GovernancePolicy, now: Timestamp) -> Self {
        let metrics = metrics::derive(&record, now);
        let suggested_action = action::classify(&record, &metrics, policy, now);
        Self {
            record,
            metrics,
            suggested_action,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.record.name
    }

    #[must_use]
    pub fn business_unit(&self) -> Option<&str> {
        self.record.business_unit.as_deref()
    }
}

/// Assess every record in parallel. Output order matches input order.
#[must_use]
pub fn assess_all(
    records: Vec<AutomationRecord>,
    policy: &GovernancePolicy,
    now: Timestamp,
) -> Vec<AssessedAutomation> {
    records
        .into_par_iter()
        .map(|record| AssessedAutomation::assess(record, policy, now))
        .collect()
}
