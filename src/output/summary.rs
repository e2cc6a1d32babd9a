//! Compact transferable form of an aggregation pool.
//!
//! Every moment is scaled by [`SCORE_SCALE`] and rounded to an integer.
//! A cohort metric seen once is stored as its scaled mean alone; anything
//! else is stored as `[n, M1, M2, M3, M4]`.

use crate::aggregator::AggregationPool;
use crate::cohort::CohortKey;
use crate::stats::MomentAccumulator;
use crate::utils::config::SCORE_SCALE;
use crate::utils::error::OutputError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Serialized moments of one cohort metric
///
/// The JSON shape (scalar or five-element array) selects the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SerializedMoments {
    /// Scaled mean of a single observation
    Single(i64),
    /// `n` and the four scaled moments
    Full(u64, i64, i64, i64, i64),
}

/// Cohort key string to metric name to moments
pub type Summary = BTreeMap<String, BTreeMap<String, SerializedMoments>>;

/// Summary read back into accumulators
pub type DecodedSummary = BTreeMap<CohortKey, BTreeMap<String, MomentAccumulator>>;

fn scale(value: f64) -> i64 {
    (value * SCORE_SCALE).round() as i64
}

fn unscale(value: i64) -> f64 {
    value as f64 / SCORE_SCALE
}

impl SerializedMoments {
    pub fn from_accumulator(acc: &MomentAccumulator) -> Self {
        if acc.count() == 1 {
            return SerializedMoments::Single(scale(acc.mean()));
        }
        let (m1, m2, m3, m4) = acc.raw_moments();
        SerializedMoments::Full(acc.count(), scale(m1), scale(m2), scale(m3), scale(m4))
    }

    /// Rebuild an accumulator; precision is limited to the serialized scale
    pub fn to_accumulator(self) -> MomentAccumulator {
        match self {
            SerializedMoments::Single(mean) => {
                MomentAccumulator::from_raw(1, unscale(mean), 0.0, 0.0, 0.0)
            }
            SerializedMoments::Full(n, m1, m2, m3, m4) => MomentAccumulator::from_raw(
                n,
                unscale(m1),
                unscale(m2),
                unscale(m3),
                unscale(m4),
            ),
        }
    }

    pub fn count(&self) -> u64 {
        match self {
            SerializedMoments::Single(_) => 1,
            SerializedMoments::Full(n, ..) => *n,
        }
    }
}

/// Flatten a pool into its summary
pub fn serialize(pool: &AggregationPool) -> Summary {
    let names = pool.metric_names();
    pool.iter()
        .map(|(key, accs)| {
            let metrics = names
                .iter()
                .cloned()
                .zip(accs.iter().map(SerializedMoments::from_accumulator))
                .collect();
            (key.to_string(), metrics)
        })
        .collect()
}

/// Read a summary back into typed keys and accumulators
///
/// # Errors
/// * `OutputError::InvalidKey` - a cohort key does not parse
pub fn deserialize(summary: &Summary) -> Result<DecodedSummary, OutputError> {
    summary
        .iter()
        .map(|(key, metrics)| {
            let key: CohortKey = key.parse()?;
            let metrics = metrics
                .iter()
                .map(|(name, moments)| (name.clone(), moments.to_accumulator()))
                .collect();
            Ok((key, metrics))
        })
        .collect()
}
