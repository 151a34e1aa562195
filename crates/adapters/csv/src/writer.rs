//! CSV report writer — one file per report view.

use std::fs::File;
use std::path::PathBuf;

use autogov_app::ports::ReportSink;
use autogov_app::report::GovernanceReport;
use autogov_domain::action::SuggestedAction;
use autogov_domain::assessment::AssessedAutomation;
use autogov_domain::error::GovernanceError;
use autogov_domain::metrics::AgeGroup;
use autogov_domain::summary::BusinessUnitSummary;
use autogov_domain::time::Timestamp;
use serde::Serialize;

use crate::error::CsvError;

pub const FULL_DATA_FILE: &str = "full_data.csv";
pub const HIGH_FREQUENCY_FILE: &str = "high_frequency.csv";
pub const FLAGGED_FILE: &str = "flagged.csv";
pub const CLASHING_FILE: &str = "clashing.csv";
pub const BUSINESS_UNITS_FILE: &str = "business_units.csv";
pub const SIMILAR_GROUPS_FILE: &str = "similar_groups.csv";

/// [`ReportSink`] writing the report views as CSV files into a directory.
///
/// Existing files are overwritten. A view with no rows yields an empty file.
#[derive(Debug, Clone)]
pub struct CsvReportWriter {
    dir: PathBuf,
}

impl CsvReportWriter {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write every view.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::Io`] when the directory or a file cannot be
    /// written, [`CsvError::Csv`] when a row cannot be serialized.
    #[tracing::instrument(skip(self, report), fields(dir = %self.dir.display()))]
    pub fn export(&self, report: &GovernanceReport) -> Result<(), CsvError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| CsvError::Io {
            path: self.dir.clone(),
            source,
        })?;

        self.write_rows(FULL_DATA_FILE, report.automations.iter().map(AutomationRow::from))?;
        self.write_rows(
            HIGH_FREQUENCY_FILE,
            report.high_frequency.iter().map(AutomationRow::from),
        )?;
        self.write_rows(FLAGGED_FILE, report.flagged.iter().map(AutomationRow::from))?;
        self.write_rows(
            CLASHING_FILE,
            report.clashing.records.iter().map(AutomationRow::from),
        )?;
        self.write_rows(
            BUSINESS_UNITS_FILE,
            report.business_units.iter().map(BusinessUnitRow::from),
        )?;
        self.write_rows(
            SIMILAR_GROUPS_FILE,
            report
                .similarity_groups
                .iter()
                .enumerate()
                .flat_map(|(index, group)| {
                    group.members.iter().map(move |member| SimilarGroupRow {
                        group_id: index + 1,
                        seed: &group.seed,
                        automation_name: member,
                    })
                }),
        )?;

        tracing::info!(files = 6, "report exported");
        Ok(())
    }

    fn write_rows<R: Serialize>(
        &self,
        file_name: &str,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<(), CsvError> {
        let path = self.dir.join(file_name);
        let file = File::create(&path).map_err(|source| CsvError::Io {
            path: path.clone(),
            source,
        })?;
        let mut writer = csv::Writer::from_writer(file);
        let mut written = 0usize;
        for row in rows {
            writer.serialize(row)?;
            written += 1;
        }
        writer
            .flush()
            .map_err(|source| CsvError::Io { path, source })?;
        tracing::debug!(file = file_name, rows = written, "view written");
        Ok(())
    }
}

impl ReportSink for CsvReportWriter {
    fn write(&self, report: &GovernanceReport) -> Result<(), GovernanceError> {
        self.export(report).map_err(CsvError::into_domain)
    }
}

/// Input columns followed by the derived ones.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct AutomationRow<'a> {
    automation_name: &'a str,
    business_unit_name: Option<&'a str>,
    created_date: Option<Timestamp>,
    last_run_time: Option<Timestamp>,
    scheduled_frequency: Option<&'a str>,
    #[serde(rename = "30DayRunCount")]
    run_30d_count: u64,
    #[serde(rename = "30DayErrorCount")]
    error_30d_count: u64,
    #[serde(rename = "30DaySkipCount")]
    skip_30d_count: u64,
    #[serde(rename = "30DayCompletionCount")]
    completion_30d_count: u64,
    #[serde(rename = "30DaySuccessRate")]
    success_rate_30d: Option<f64>,
    run_duration_minutes: Option<f64>,
    last_run_age_days: Option<i64>,
    is_active: bool,
    has_never_run: bool,
    age_group: Option<AgeGroup>,
    schedule_group: &'a str,
    error_rate: Option<f64>,
    skip_rate: Option<f64>,
    efficiency_score: Option<f64>,
    annualized_run_count: u64,
    rounded_run_time: Option<Timestamp>,
    suggested_action: SuggestedAction,
}

impl<'a> From<&'a AssessedAutomation> for AutomationRow<'a> {
    fn from(item: &'a AssessedAutomation) -> Self {
        let (record, metrics) = (&item.record, &item.metrics);
        Self {
            automation_name: &record.name,
            business_unit_name: record.business_unit.as_deref(),
            created_date: record.created_date,
            last_run_time: record.last_run_time,
            scheduled_frequency: record.scheduled_frequency.as_deref(),
            run_30d_count: record.run_30d_count,
            error_30d_count: record.error_30d_count,
            skip_30d_count: record.skip_30d_count,
            completion_30d_count: record.completion_30d_count,
            success_rate_30d: record.success_rate_30d,
            run_duration_minutes: record.run_duration_minutes,
            last_run_age_days: metrics.last_run_age_days,
            is_active: metrics.is_active,
            has_never_run: metrics.has_never_run,
            age_group: metrics.age_group,
            schedule_group: &metrics.schedule_group,
            error_rate: metrics.error_rate,
            skip_rate: metrics.skip_rate,
            efficiency_score: metrics.efficiency_score,
            annualized_run_count: metrics.annualized_run_count,
            rounded_run_time: metrics.rounded_run_time,
            suggested_action: item.suggested_action,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct BusinessUnitRow<'a> {
    business_unit_name: Option<&'a str>,
    total_automations: usize,
    active_automations: usize,
    avg_success_rate: Option<f64>,
    total_runs: u64,
    estimated_annual_runs: u64,
}

impl<'a> From<&'a BusinessUnitSummary> for BusinessUnitRow<'a> {
    fn from(summary: &'a BusinessUnitSummary) -> Self {
        Self {
            business_unit_name: summary.business_unit.as_deref(),
            total_automations: summary.total_automations,
            active_automations: summary.active_automations,
            avg_success_rate: summary.avg_success_rate,
            total_runs: summary.total_runs,
            estimated_annual_runs: summary.estimated_annual_runs,
        }
    }
}

/// Groups in long form: one row per member.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct SimilarGroupRow<'a> {
    group_id: usize,
    seed: &'a str,
    automation_name: &'a str,
}
