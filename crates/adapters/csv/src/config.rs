//! CSV ingestion configuration.

use chrono::{FixedOffset, Offset, Utc};
use serde::Deserialize;

use crate::error::CsvError;

/// Delimiters tried by the sniffer, in tie-break order.
pub const CANDIDATE_DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Configuration for reading automation exports.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    /// Field delimiter. When `None`, it is sniffed from the header line.
    pub delimiter: Option<char>,
    /// Offset (minutes east of UTC) at which timestamps without a zone are read.
    pub naive_utc_offset_minutes: i32,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            naive_utc_offset_minutes: 0,
        }
    }
}

impl CsvConfig {
    /// The configured delimiter as a byte, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CsvError::InvalidDelimiter`] for a non-ASCII delimiter.
    pub fn delimiter_byte(&self) -> Result<Option<u8>, CsvError> {
        self.delimiter
            .map(|delimiter| {
                u8::try_from(delimiter)
                    .ok()
                    .filter(u8::is_ascii)
                    .ok_or(CsvError::InvalidDelimiter(delimiter))
            })
            .transpose()
    }

    /// Offset applied to naive timestamps. Out-of-range values fall back to UTC.
    #[must_use]
    pub fn naive_offset(&self) -> FixedOffset {
        self.naive_utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!(
                    minutes = self.naive_utc_offset_minutes,
                    "naive UTC offset out of range, using UTC"
                );
                Utc.fix()
            })
    }
}
