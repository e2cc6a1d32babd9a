//! Run report written next to the summary.

use crate::aggregator::{AggregationPool, Diagnostics};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// What one aggregation run produced and skipped
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Summary schema version
    pub version: String,

    /// RFC 3339 timestamp of the run
    pub generated_at: String,

    /// Metric names in summary order
    pub metrics: Vec<String>,

    /// Distinct cohorts in the summary
    pub cohorts: usize,

    /// Opening round used for favor sets
    pub opening_round: u8,

    pub diagnostics: Diagnostics,
}

impl RunReport {
    /// Report for a finished pool
    ///
    /// `ingest` holds the match-level counters gathered before aggregation;
    /// the pool's own record-level counters are added to them.
    pub fn new(pool: &AggregationPool, ingest: &Diagnostics) -> Self {
        let mut diagnostics = ingest.clone();
        diagnostics.merge(pool.diagnostics());

        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            metrics: pool.metric_names(),
            cohorts: pool.len(),
            opening_round: pool.builder().opening_round(),
            diagnostics,
        }
    }
}
