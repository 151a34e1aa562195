//! Record filters — narrow an assessed collection before reporting.

use autogov_domain::action::SuggestedAction;
use autogov_domain::assessment::AssessedAutomation;

/// Criteria combined with AND. An empty list or `None` does not restrict.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub business_units: Vec<String>,
    pub actions: Vec<SuggestedAction>,
    /// Matched against the derived schedule group (`"Blank"` included).
    pub schedule_groups: Vec<String>,
    /// Case-insensitive substring of the automation name.
    pub name_search: Option<String>,
}

impl RecordFilter {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.business_units.is_empty()
            && self.actions.is_empty()
            && self.schedule_groups.is_empty()
            && self.name_search.as_deref().is_none_or(str::is_empty)
    }

    #[must_use]
    pub fn matches(&self, item: &AssessedAutomation) -> bool {
        let unit_ok = self.business_units.is_empty()
            || item
                .business_unit()
                .is_some_and(|unit| self.business_units.iter().any(|wanted| wanted == unit));
        let action_ok =
            self.actions.is_empty() || self.actions.contains(&item.suggested_action);
        let schedule_ok = self.schedule_groups.is_empty()
            || self
                .schedule_groups
                .iter()
                .any(|wanted| *wanted == item.metrics.schedule_group);
        let name_ok = match self.name_search.as_deref() {
            None | Some("") => true,
            Some(needle) => item
                .name()
                .to_lowercase()
                .contains(&needle.to_lowercase()),
        };
        unit_ok && action_ok && schedule_ok && name_ok
    }

    /// Keep the matching items, in order.
    #[must_use]
    pub fn apply(&self, items: Vec<AssessedAutomation>) -> Vec<AssessedAutomation> {
        if self.is_empty() {
            return items;
        }
        items.into_iter().filter(|item| self.matches(item)).collect()
    }
}
