//! # autogov-adapter-csv
//!
//! CSV adapter — reads automation exports into records and writes the
//! governance report views back out as CSV files.
//!
//! ## Reading
//!
//! | Concern | Behavior |
//! |---------|----------|
//! | Header | trimmed, UTF-8 BOM stripped, all missing columns reported at once |
//! | Delimiter | configured, or sniffed among `,` `;` tab `\|` |
//! | Timestamps | RFC 3339, ISO-like naive, `MM/DD/YYYY`; naive read at a configured offset |
//! | Counts | non-negative integers (`12.0` accepted); anything else fails the input |
//! | Success rate, duration | out of range or unparseable degrade to `None` |
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `autogov-app` and `autogov-domain`.

mod config;
mod error;
pub mod reader;
pub mod timestamp;
pub mod writer;

pub use config::CsvConfig;
pub use error::CsvError;
pub use reader::CsvRecordSource;
pub use writer::CsvReportWriter;
