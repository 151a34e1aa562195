//! Business unit rollups.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::assessment::AssessedAutomation;

/// Aggregate figures for one business unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessUnitSummary {
    /// `None` groups the records without a business unit.
    pub business_unit: Option<String>,
    pub total_automations: usize,
    pub active_automations: usize,
    /// Mean of the defined success rates; `None` when none is defined.
    pub avg_success_rate: Option<f64>,
    pub total_runs: u64,
    pub estimated_annual_runs: u64,
}

#[derive(Default)]
struct Accumulator {
    total: usize,
    active: usize,
    success_sum: f64,
    success_count: usize,
    runs: u64,
    annual_runs: u64,
}

impl Accumulator {
    fn add(&mut self, item: &AssessedAutomation) {
        self.total += 1;
        if item.metrics.is_active {
            self.active += 1;
        }
        if let Some(rate) = item.record.success_rate_30d {
            self.success_sum += rate;
            self.success_count += 1;
        }
        self.runs = self.runs.saturating_add(item.record.run_30d_count);
        self.annual_runs = self
            .annual_runs
            .saturating_add(item.metrics.annualized_run_count);
    }

    #[allow(clippy::cast_precision_loss)]
    fn finish(self, business_unit: Option<String>) -> BusinessUnitSummary {
        BusinessUnitSummary {
            business_unit,
            total_automations: self.total,
            active_automations: self.active,
            avg_success_rate: (self.success_count > 0)
                .then(|| self.success_sum / self.success_count as f64),
            total_runs: self.runs,
            estimated_annual_runs: self.annual_runs,
        }
    }
}

/// Group by business unit. Sorted by unit name; the unnamed group comes last.
#[must_use]
pub fn summarize_by_business_unit(assessed: &[AssessedAutomation]) -> Vec<BusinessUnitSummary> {
    let mut groups: HashMap<Option<&str>, Accumulator> = HashMap::new();
    for item in assessed {
        groups.entry(item.business_unit()).or_default().add(item);
    }

    let mut summaries: Vec<_> = groups
        .into_iter()
        .map(|(unit, acc)| acc.finish(unit.map(str::to_string)))
        .collect();
    summaries.sort_by(|a, b| {
        (a.business_unit.is_none(), &a.business_unit)
            .cmp(&(b.business_unit.is_none(), &b.business_unit))
    });
    summaries
}
