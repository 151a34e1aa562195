//! # autogov-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement:
//!   - `RecordSource` — turn raw input bytes into automation records
//!   - `ReportSink` — hand a finished governance report to an exporter
//! - Define the **driving/inbound** use case:
//!   - `AnalysisService` — ingest, derive, classify, cluster, roll up
//! - Provide **in-process infrastructure** that doesn't need IO
//!   (ingestion cache, record filters, report views)
//!
//! ## Dependency rule
//! Depends on `autogov-domain` only (plus `sha2` for content hashing).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod cache;
pub mod filter;
pub mod ports;
pub mod report;
pub mod services;
pub mod views;
