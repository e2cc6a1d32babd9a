//! Per-pass counters reported alongside the summary.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What was seen, skipped and dropped during one refresh and aggregation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Match ids listed in the game list
    pub matches_seen: u64,

    /// Matches freshly parsed in this run
    pub matches_parsed: u64,

    /// Matches served from the parse cache
    pub matches_cached: u64,

    /// Whole matches skipped, by reason
    pub matches_skipped: BTreeMap<String, u64>,

    /// Participants that left their match early
    pub participants_dropped: u64,

    /// Participants skipped, by reason
    pub participants_skipped: BTreeMap<String, u64>,

    /// Records that reached a cohort
    pub records_absorbed: u64,

    /// Observations discarded for one metric only, by metric name
    pub observations_dropped: BTreeMap<String, u64>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_match(&mut self, reason: &str) {
        *self.matches_skipped.entry(reason.to_string()).or_default() += 1;
    }

    pub fn skip_participant(&mut self, reason: &str) {
        *self.participants_skipped.entry(reason.to_string()).or_default() += 1;
    }

    pub fn drop_observation(&mut self, metric: &str) {
        *self.observations_dropped.entry(metric.to_string()).or_default() += 1;
    }

    pub fn total_matches_skipped(&self) -> u64 {
        self.matches_skipped.values().sum()
    }

    pub fn total_participants_skipped(&self) -> u64 {
        self.participants_skipped.values().sum()
    }

    pub fn total_observations_dropped(&self) -> u64 {
        self.observations_dropped.values().sum()
    }

    /// Add another pass's counters into this one
    pub fn merge(&mut self, other: &Diagnostics) {
        self.matches_seen += other.matches_seen;
        self.matches_parsed += other.matches_parsed;
        self.matches_cached += other.matches_cached;
        self.participants_dropped += other.participants_dropped;
        self.records_absorbed += other.records_absorbed;

        for (reason, count) in &other.matches_skipped {
            *self.matches_skipped.entry(reason.clone()).or_default() += count;
        }
        for (reason, count) in &other.participants_skipped {
            *self.participants_skipped.entry(reason.clone()).or_default() += count;
        }
        for (metric, count) in &other.observations_dropped {
            *self.observations_dropped.entry(metric.clone()).or_default() += count;
        }
    }
}
