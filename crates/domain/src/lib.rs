//! # autogov-domain
//!
//! Pure domain model for the automation governance analyzer.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, timestamps
//! - Define **records** (one scheduled automation with its run history)
//! - Derive **metrics** (age, activity, rates, volume) from raw fields
//! - Classify each record into a single **suggested action** (ordered cascade)
//! - Cluster near-duplicate automation names by **similarity**
//! - Roll records up into **business unit summaries**
//! - Hold the **policy** thresholds the rules above are evaluated against
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod action;
pub mod assessment;
pub mod metrics;
pub mod policy;
pub mod record;
pub mod similarity;
pub mod summary;
