//! Cohortstat
//!
//! Single-pass aggregation of the first four statistical moments over
//! cohorts of Terra Mystica match participants.
//!
//! This crate provides the core implementation for the
//! `cohortstat` CLI tool: match parsing, cohort keys, mergeable moment
//! accumulators and the compact summary format.
//!
//! ## Getting Started
//!
//! ```bash
//! cohortstat aggregate --games games/ --list gamelist.json --summary
//! cohortstat lookup --key i4223454a --value 120
//! ```

pub mod aggregator;
pub mod cohort;
pub mod commands;
pub mod ingest;
pub mod output;
pub mod parser;
pub mod stats;
pub mod utils;
