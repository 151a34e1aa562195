//! End-to-end tests for the full autogov stack.
//!
//! The library tests wire the real CSV source, the analysis service and the
//! CSV writer together exactly like `main` does. The CLI tests run the built
//! binary against a fixture file in a temporary directory.

use std::path::Path;
use std::process::Command;

use autogov_adapter_csv::writer::{FLAGGED_FILE, FULL_DATA_FILE, SIMILAR_GROUPS_FILE};
use autogov_adapter_csv::{CsvConfig, CsvRecordSource, CsvReportWriter};
use autogov_app::filter::RecordFilter;
use autogov_app::report::{GovernanceReport, ReportSettings};
use autogov_app::services::analysis::AnalysisService;
use autogov_domain::action::SuggestedAction;
use autogov_domain::error::{GovernanceError, IngestError};
use autogov_domain::time::Timestamp;
use chrono::{TimeZone, Utc};
use pretty_assertions::assert_eq;

const EXPORT: &str = "\
AutomationName,BusinessUnitName,CreatedDate,LastRunTime,ScheduledFrequency,30DayRunCount,30DayErrorCount,30DaySkipCount,30DayCompletionCount,30DaySuccessRate,RunDurationMinutes
Invoice Sync,Finance,2023-01-10,2024-05-31 08:10:00,\"Every hour, weekdays\",600,12,0,588,0.98,3
Invoice Sync v2,Finance,2023-06-01,2024-05-31 07:55:00,Daily,30,0,0,30,1.0,55
Payroll Export,HR,2023-09-01,,Weekly,0,0,0,0,,
Legacy Cleanup,HR,2022-01-01,2023-10-01 02:00:00,Monthly,0,0,0,0,,
Report Mailer,,2024-05-20,2024-05-30 14:00:00,Daily,20,15,0,5,0.25,
Data Loader,Ops,2024-01-01,2024-05-29 03:00:00,Daily,40,0,0,10,0.9,12
";

const NOW: &str = "2024-06-01T12:00:00Z";

fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn service() -> AnalysisService<CsvRecordSource> {
    let source = CsvRecordSource::new(&CsvConfig::default()).unwrap();
    AnalysisService::new(source, ReportSettings::default()).unwrap()
}

fn analyze(filter: &RecordFilter) -> GovernanceReport {
    service().analyze(EXPORT.as_bytes(), now(), filter).unwrap()
}

fn write_fixture(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("export.csv");
    std::fs::write(&path, content).unwrap();
    path
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

#[test]
fn should_classify_every_automation() {
    let report = analyze(&RecordFilter::default());
    let actions: Vec<(&str, SuggestedAction)> = report
        .automations
        .iter()
        .map(|item| (item.name(), item.suggested_action))
        .collect();
    assert_eq!(
        actions,
        vec![
            ("Invoice Sync", SuggestedAction::ReviewHighFrequency),
            ("Invoice Sync v2", SuggestedAction::Keep),
            ("Payroll Export", SuggestedAction::CreatedButNeverRun),
            ("Legacy Cleanup", SuggestedAction::Stale),
            ("Report Mailer", SuggestedAction::ErrorProne),
            ("Data Loader", SuggestedAction::Inefficient),
        ]
    );
}

#[test]
fn should_group_similar_names() {
    let report = analyze(&RecordFilter::default());
    assert_eq!(report.similarity_groups.len(), 1);
    assert_eq!(
        report.similarity_groups[0].members,
        vec!["Invoice Sync".to_string(), "Invoice Sync v2".to_string()]
    );
}

#[test]
fn should_summarize_business_units_with_missing_unit_last() {
    let report = analyze(&RecordFilter::default());
    let units: Vec<Option<&str>> = report
        .business_units
        .iter()
        .map(|unit| unit.business_unit.as_deref())
        .collect();
    assert_eq!(units, vec![Some("Finance"), Some("HR"), Some("Ops"), None]);

    let finance = &report.business_units[0];
    assert_eq!(finance.total_automations, 2);
    assert_eq!(finance.active_automations, 2);
    assert_eq!(finance.total_runs, 630);
    assert_eq!(finance.estimated_annual_runs, 7_560);
    assert!((finance.avg_success_rate.unwrap() - 0.99).abs() < 1e-9);

    let total: usize = report
        .business_units
        .iter()
        .map(|unit| unit.total_automations)
        .sum();
    assert_eq!(total, report.automations.len());
}

#[test]
fn should_build_report_views() {
    let report = analyze(&RecordFilter::default());
    assert_eq!(report.flagged.len(), 5);
    assert_eq!(report.high_frequency.len(), 1);
    assert_eq!(report.clashing.records.len(), 2);
    assert_eq!(report.clashing.unique_names, 2);
    assert_eq!(report.timeout_risk.len(), 1);
    assert_eq!(report.timeout_risk[0].name(), "Invoice Sync v2");
    assert_eq!(report.top_error_prone[0].name(), "Report Mailer");
    assert_eq!(
        report
            .age_distribution
            .iter()
            .map(|bin| bin.count)
            .sum::<usize>(),
        5
    );
}

#[test]
fn should_restrict_report_to_filtered_records() {
    let filter = RecordFilter {
        business_units: vec!["HR".to_string()],
        ..RecordFilter::default()
    };
    let report = analyze(&filter);
    assert_eq!(report.automations.len(), 2);
    assert!(report.similarity_groups.is_empty());
    assert_eq!(report.business_units.len(), 1);
}

#[test]
fn should_fail_fast_on_missing_columns() {
    let input = "AutomationName,BusinessUnitName\nJob,HR\n";
    let err = service()
        .analyze(input.as_bytes(), now(), &RecordFilter::default())
        .unwrap_err();
    match err {
        GovernanceError::Ingest(IngestError::MissingColumns(columns)) => {
            assert_eq!(columns.len(), 8);
            assert_eq!(columns[0], "CreatedDate");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn should_export_views_through_writer() {
    let dir = tempfile::tempdir().unwrap();
    let writer = CsvReportWriter::new(dir.path());
    service()
        .analyze_and_export(
            EXPORT.as_bytes(),
            now(),
            &RecordFilter::default(),
            &[&writer],
        )
        .unwrap();

    let flagged = std::fs::read_to_string(dir.path().join(FLAGGED_FILE)).unwrap();
    assert_eq!(flagged.lines().count(), 6);
    let full = std::fs::read_to_string(dir.path().join(FULL_DATA_FILE)).unwrap();
    assert!(full.contains("\"Every hour, weekdays\""));
    let groups = std::fs::read_to_string(dir.path().join(SIMILAR_GROUPS_FILE)).unwrap();
    assert_eq!(groups.lines().count(), 3);
}

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

fn autogov(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_autogov"))
        .current_dir(dir)
        .env_remove("AUTOGOV_CLUSTER_THRESHOLD")
        .env("RUST_LOG", "off")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn should_print_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), EXPORT);
    let output = autogov(
        dir.path(),
        &[input.to_str().unwrap(), "--now", NOW, "--format", "json"],
    );
    assert!(output.status.success());

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["automations"].as_array().unwrap().len(), 6);
    assert_eq!(
        report["automations"][3]["suggested_action"],
        "Stale – Consider Archiving"
    );
    assert_eq!(report["automations"][3]["metrics"]["age_group"], "6–12 mo");
    assert_eq!(report["similarity_groups"][0]["seed"], "Invoice Sync");
}

#[test]
fn should_print_text_report_with_filters() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), EXPORT);
    let output = autogov(
        dir.path(),
        &[
            input.to_str().unwrap(),
            "--now",
            NOW,
            "--action",
            "error-prone",
        ],
    );
    assert!(output.status.success());
    let text = String::from_utf8(output.stdout).unwrap();
    assert!(text.contains("  automations:     1\n"));
    assert!(text.contains("Report Mailer"));
    assert!(!text.contains("Legacy Cleanup"));
}

#[test]
fn should_export_csv_files_from_cli() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), EXPORT);
    let out_dir = dir.path().join("out");
    let output = autogov(
        dir.path(),
        &[
            input.to_str().unwrap(),
            "--now",
            NOW,
            "--export-dir",
            out_dir.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert!(out_dir.join(FULL_DATA_FILE).exists());
    assert!(out_dir.join(FLAGGED_FILE).exists());
}

#[test]
fn should_apply_config_file_from_working_directory() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), EXPORT);
    std::fs::write(
        dir.path().join("autogov.toml"),
        "[policy]\nstale_after_days = 400\n",
    )
    .unwrap();
    let output = autogov(
        dir.path(),
        &[input.to_str().unwrap(), "--now", NOW, "--format", "json"],
    );
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["automations"][3]["suggested_action"], "Inactive");
}

#[test]
fn should_exit_with_error_on_missing_columns() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "AutomationName\nJob\n");
    let output = autogov(dir.path(), &[input.to_str().unwrap()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("missing required column(s): BusinessUnitName, CreatedDate"));
}
