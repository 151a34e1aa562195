//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod record_source;
pub mod report_sink;

pub use record_source::RecordSource;
pub use report_sink::ReportSink;
