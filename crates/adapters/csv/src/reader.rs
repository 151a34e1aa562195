//! CSV record source — turns an automation export into validated records.

use autogov_app::ports::RecordSource;
use autogov_domain::error::{GovernanceError, IngestError};
use autogov_domain::record::AutomationRecord;
use chrono::FixedOffset;

use crate::config::{CANDIDATE_DELIMITERS, CsvConfig};
use crate::error::CsvError;
use crate::timestamp::parse_timestamp;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub const COL_NAME: &str = "AutomationName";
pub const COL_BUSINESS_UNIT: &str = "BusinessUnitName";
pub const COL_CREATED: &str = "CreatedDate";
pub const COL_LAST_RUN: &str = "LastRunTime";
pub const COL_FREQUENCY: &str = "ScheduledFrequency";
pub const COL_RUNS: &str = "30DayRunCount";
pub const COL_ERRORS: &str = "30DayErrorCount";
pub const COL_SKIPS: &str = "30DaySkipCount";
pub const COL_COMPLETIONS: &str = "30DayCompletionCount";
pub const COL_SUCCESS_RATE: &str = "30DaySuccessRate";
pub const COL_DURATION: &str = "RunDurationMinutes";

/// Columns an export must carry, in the order they are reported when missing.
pub const REQUIRED_COLUMNS: [&str; 10] = [
    COL_NAME,
    COL_BUSINESS_UNIT,
    COL_CREATED,
    COL_LAST_RUN,
    COL_FREQUENCY,
    COL_RUNS,
    COL_ERRORS,
    COL_SKIPS,
    COL_COMPLETIONS,
    COL_SUCCESS_RATE,
];

/// [`RecordSource`] reading delimited text.
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    delimiter: Option<u8>,
    naive_offset: FixedOffset,
}

impl CsvRecordSource {
    /// Create a source from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::InvalidDelimiter`] for a non-ASCII delimiter.
    pub fn new(config: &CsvConfig) -> Result<Self, CsvError> {
        Ok(Self {
            delimiter: config.delimiter_byte()?,
            naive_offset: config.naive_offset(),
        })
    }

    /// Parse `raw` into records, in row order.
    ///
    /// # Errors
    ///
    /// - [`IngestError::MissingColumns`] when required headers are absent
    /// - [`IngestError::InvalidField`] when a count cell is not a non-negative integer
    /// - [`IngestError::Empty`] when there is no data row
    /// - [`CsvError::Csv`] when the text itself is malformed
    #[tracing::instrument(skip(self, raw), fields(bytes = raw.len()))]
    pub fn parse(&self, raw: &[u8]) -> Result<Vec<AutomationRecord>, CsvError> {
        let raw = raw.strip_prefix(UTF8_BOM).unwrap_or(raw);
        let delimiter = self.delimiter.unwrap_or_else(|| sniff_delimiter(raw));

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(raw);
        let columns = Columns::resolve(reader.headers()?)?;

        let mut records = Vec::new();
        let mut degraded = 0usize;
        for (index, row) in reader.records().enumerate() {
            let row = row?;
            if row.iter().all(str::is_empty) {
                continue;
            }
            let (record, row_degraded) = self.parse_row(&columns, &row, index + 1)?;
            degraded += row_degraded;
            records.push(record);
        }

        if records.is_empty() {
            return Err(IngestError::Empty.into());
        }
        tracing::info!(
            records = records.len(),
            degraded_fields = degraded,
            delimiter = %char::from(delimiter).escape_default(),
            "automation export parsed"
        );
        Ok(records)
    }

    /// Build one record; returns it with the number of fields degraded to `None`.
    fn parse_row(
        &self,
        columns: &Columns,
        row: &csv::StringRecord,
        row_number: usize,
    ) -> Result<(AutomationRecord, usize), CsvError> {
        let cell = |index: usize| row.get(index).unwrap_or_default();
        let text = |index: usize| {
            Some(cell(index))
                .filter(|value| !value.is_empty())
                .map(String::from)
        };
        let count = |index: usize, column: &str| parse_count(cell(index), row_number, column);
        let mut degraded = 0;

        let mut timestamp = |index: usize, column: &str| {
            let value = cell(index);
            let parsed = parse_timestamp(value, self.naive_offset);
            if parsed.is_none() && !value.is_empty() {
                degraded += 1;
                tracing::debug!(row = row_number, column, value, "unparseable timestamp");
            }
            parsed
        };
        let created_date = timestamp(columns.created, COL_CREATED);
        let last_run_time = timestamp(columns.last_run, COL_LAST_RUN);

        let success_rate_30d = parse_fraction(cell(columns.success_rate));
        if success_rate_30d.is_none() && !cell(columns.success_rate).is_empty() {
            degraded += 1;
            tracing::warn!(
                row = row_number,
                value = cell(columns.success_rate),
                "success rate is not a fraction in [0, 1], ignoring"
            );
        }

        let run_duration_minutes = columns.duration.and_then(|index| {
            let value = cell(index);
            let parsed = parse_duration(value);
            if parsed.is_none() && !value.is_empty() {
                degraded += 1;
                tracing::warn!(
                    row = row_number,
                    value,
                    "run duration is not a non-negative number, ignoring"
                );
            }
            parsed
        });

        let record = AutomationRecord {
            name: cell(columns.name).to_owned(),
            business_unit: text(columns.business_unit),
            created_date,
            last_run_time,
            scheduled_frequency: text(columns.frequency),
            run_30d_count: count(columns.runs, COL_RUNS)?,
            error_30d_count: count(columns.errors, COL_ERRORS)?,
            skip_30d_count: count(columns.skips, COL_SKIPS)?,
            completion_30d_count: count(columns.completions, COL_COMPLETIONS)?,
            success_rate_30d,
            run_duration_minutes,
        };
        record.validate()?;
        Ok((record, degraded))
    }
}

impl RecordSource for CsvRecordSource {
    fn read(&self, raw: &[u8]) -> Result<Vec<AutomationRecord>, GovernanceError> {
        self.parse(raw).map_err(CsvError::into_domain)
    }
}

/// Header positions of the known columns.
#[derive(Debug, PartialEq, Eq)]
struct Columns {
    name: usize,
    business_unit: usize,
    created: usize,
    last_run: usize,
    frequency: usize,
    runs: usize,
    errors: usize,
    skips: usize,
    completions: usize,
    success_rate: usize,
    duration: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Result<Self, IngestError> {
        let position = |name: &str| headers.iter().position(|header| header == name);
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&name| position(name).is_none())
            .map(|&name| name.to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(IngestError::MissingColumns(missing));
        }

        let required = |name: &str| position(name).unwrap_or_default();
        Ok(Self {
            name: required(COL_NAME),
            business_unit: required(COL_BUSINESS_UNIT),
            created: required(COL_CREATED),
            last_run: required(COL_LAST_RUN),
            frequency: required(COL_FREQUENCY),
            runs: required(COL_RUNS),
            errors: required(COL_ERRORS),
            skips: required(COL_SKIPS),
            completions: required(COL_COMPLETIONS),
            success_rate: required(COL_SUCCESS_RATE),
            duration: position(COL_DURATION),
        })
    }
}

/// Pick the candidate delimiter occurring most often (outside quotes) in the
/// header line. Ties go to the earlier candidate; no candidate at all means `,`.
#[must_use]
pub fn sniff_delimiter(raw: &[u8]) -> u8 {
    let mut counts = [0usize; CANDIDATE_DELIMITERS.len()];
    let mut quoted = false;
    for &byte in raw {
        match byte {
            b'"' => quoted = !quoted,
            b'\n' if !quoted => break,
            _ if !quoted => {
                if let Some(slot) = CANDIDATE_DELIMITERS.iter().position(|&d| d == byte) {
                    counts[slot] += 1;
                }
            }
            _ => {}
        }
    }

    let best = (1..counts.len()).fold(0, |best, slot| {
        if counts[slot] > counts[best] { slot } else { best }
    });
    CANDIDATE_DELIMITERS[best]
}

/// Empty cells count as zero; integral floats such as `12.0` are accepted.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn parse_count(value: &str, row: usize, column: &str) -> Result<u64, IngestError> {
    if value.is_empty() {
        return Ok(0);
    }
    if let Ok(count) = value.parse::<u64>() {
        return Ok(count);
    }
    match value.parse::<f64>() {
        Ok(count) if count >= 0.0 && count.fract() == 0.0 && count < u64::MAX as f64 => {
            Ok(count as u64)
        }
        _ => Err(IngestError::InvalidField {
            row,
            column: column.to_owned(),
            value: value.to_owned(),
        }),
    }
}

/// A fraction in `[0, 1]`; a trailing `%` divides by 100.
fn parse_fraction(value: &str) -> Option<f64> {
    let fraction = match value.strip_suffix('%') {
        Some(percent) => percent.trim_end().parse::<f64>().ok()? / 100.0,
        None => value.parse::<f64>().ok()?,
    };
    (0.0..=1.0).contains(&fraction).then_some(fraction)
}

fn parse_duration(value: &str) -> Option<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|minutes| minutes.is_finite() && *minutes >= 0.0)
}
