//! Plain-text rendering of a governance report.

use std::io::{self, Write};

use autogov_app::report::GovernanceReport;
use autogov_domain::assessment::AssessedAutomation;

const NO_BUSINESS_UNIT: &str = "(none)";

/// Write the human-readable report to `out`.
///
/// # Errors
///
/// Propagates write failures.
pub fn write_text<W: Write>(out: &mut W, report: &GovernanceReport) -> io::Result<()> {
    let total = report.automations.len();
    let active = report
        .automations
        .iter()
        .filter(|item| item.metrics.is_active)
        .count();

    writeln!(
        out,
        "Automation governance report ({})",
        report.generated_at.to_rfc3339()
    )?;
    writeln!(out, "  automations:     {total}")?;
    writeln!(out, "  active:          {active}")?;
    writeln!(out, "  flagged:         {}", report.flagged.len())?;
    writeln!(out, "  high frequency:  {}", report.high_frequency.len())?;
    writeln!(
        out,
        "  clashing:        {} ({} unique names)",
        report.clashing.records.len(),
        report.clashing.unique_names
    )?;
    writeln!(out, "  timeout risk:    {}", report.timeout_risk.len())?;

    section(out, "Suggested actions")?;
    for entry in &report.action_breakdown {
        writeln!(out, "  {:<28} {:>6}", entry.action.label(), entry.count)?;
    }

    section(out, "Business units")?;
    writeln!(
        out,
        "  {:<24} {:>6} {:>6} {:>8} {:>10} {:>12}",
        "unit", "total", "active", "success", "runs 30d", "runs / year"
    )?;
    for unit in &report.business_units {
        writeln!(
            out,
            "  {:<24} {:>6} {:>6} {:>8} {:>10} {:>12}",
            unit.business_unit.as_deref().unwrap_or(NO_BUSINESS_UNIT),
            unit.total_automations,
            unit.active_automations,
            percent(unit.avg_success_rate),
            unit.total_runs,
            unit.estimated_annual_runs
        )?;
    }

    section(out, "Similar names")?;
    if report.similarity_groups.is_empty() {
        writeln!(out, "  none")?;
    }
    for group in &report.similarity_groups {
        writeln!(out, "  {}: {}", group.seed, group.members.join(" | "))?;
    }

    section(out, "Most error-prone")?;
    for item in &report.top_error_prone {
        writeln!(
            out,
            "  {:<40} {:>8}",
            item.name(),
            percent(item.metrics.error_rate)
        )?;
    }

    section(out, "Last-run age")?;
    for bin in &report.age_distribution {
        writeln!(out, "  {:<12} {:>6}", bin.age_group.label(), bin.count)?;
    }

    section(out, "Rush hours (UTC)")?;
    for slot in &report.rush_hours {
        writeln!(out, "  {:02}:00 {:>6}", slot.hour, slot.count)?;
    }

    section(out, "Flagged automations")?;
    for item in &report.flagged {
        flagged_line(out, item)?;
    }
    Ok(())
}

fn section<W: Write>(out: &mut W, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{title}")
}

fn flagged_line<W: Write>(out: &mut W, item: &AssessedAutomation) -> io::Result<()> {
    writeln!(
        out,
        "  {:<40} {:<24} {}",
        item.name(),
        item.business_unit().unwrap_or(NO_BUSINESS_UNIT),
        item.suggested_action
    )
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.1}%", v * 100.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use autogov_app::report::ReportSettings;
    use autogov_domain::assessment;
    use autogov_domain::record::AutomationRecord;
    use chrono::{TimeDelta, TimeZone, Utc};

    fn render(records: Vec<AutomationRecord>) -> String {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let settings = ReportSettings::default();
        let assessed = assessment::assess_all(records, &settings.policy, now);
        let report = GovernanceReport::build(assessed, &settings, now);
        let mut out = Vec::new();
        write_text(&mut out, &report).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn should_render_counts_and_sections() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let text = render(vec![
            AutomationRecord::builder()
                .name("Invoice Sync")
                .business_unit("Finance")
                .last_run_time(now - TimeDelta::days(1))
                .counts(10, 1, 0, 9)
                .success_rate_30d(0.9)
                .build()
                .unwrap(),
            AutomationRecord::builder()
                .name("Invoice Sync v2")
                .build()
                .unwrap(),
        ]);
        assert!(text.starts_with("Automation governance report (2024-06-01T12:00:00+00:00)"));
        assert!(text.contains("  automations:     2\n"));
        assert!(text.contains("  flagged:         1\n"));
        assert!(text.contains("Invoice Sync: Invoice Sync | Invoice Sync v2"));
        assert!(text.contains("90.0%"));
        assert!(text.contains("(none)"));
        assert!(text.contains("No Run History"));
    }

    #[test]
    fn should_say_none_without_similar_names() {
        let text = render(vec![
            AutomationRecord::builder().name("Payroll").build().unwrap(),
        ]);
        assert!(text.contains("Similar names\n  none\n"));
    }

    #[test]
    fn should_format_missing_percent_as_dash() {
        assert_eq!(percent(None), "-");
        assert_eq!(percent(Some(0.125)), "12.5%");
    }
}
