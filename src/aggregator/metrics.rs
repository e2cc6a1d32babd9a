//! Metric functions evaluated per participant record.
//!
//! A metric maps a record to one scalar observation. `None` means the
//! metric does not apply to this record; the observation is dropped for
//! that metric only.

use crate::parser::events::BuildingTier;
use crate::parser::record::ParticipantRecord;
use crate::utils::config::ROUND_COUNT;
use crate::utils::error::PoolError;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A named scalar extracted from a participant record
pub trait Metric: Send + Sync {
    /// Name used as the metric key in the summary
    fn name(&self) -> String;

    fn evaluate(&self, record: &ParticipantRecord) -> Option<f64>;
}

/// Shared, ordered list of metrics
pub type MetricList = Vec<Arc<dyn Metric>>;

/// Metrics available by name from configuration
///
/// - `score`: final victory points
/// - `margin`: score minus the match mean
/// - `vp:<source>`: victory points from one source (e.g. `vp:faction`)
/// - `built:<TIER>@<round>`: structures of a tier standing after a round
///   (e.g. `built:TP@1`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuiltinMetric {
    Score,
    Margin,
    VpSource(String),
    Standing { tier: BuildingTier, round: usize },
}

impl fmt::Display for BuiltinMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuiltinMetric::Score => write!(f, "score"),
            BuiltinMetric::Margin => write!(f, "margin"),
            BuiltinMetric::VpSource(source) => write!(f, "vp:{}", source),
            BuiltinMetric::Standing { tier, round } => {
                write!(f, "built:{}@{}", tier.abbreviation(), round)
            }
        }
    }
}

impl FromStr for BuiltinMetric {
    type Err = PoolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || PoolError::UnknownMetric(s.to_string());

        match s {
            "score" => return Ok(BuiltinMetric::Score),
            "margin" => return Ok(BuiltinMetric::Margin),
            _ => {}
        }

        if let Some(source) = s.strip_prefix("vp:") {
            if source.is_empty() {
                return Err(unknown());
            }
            return Ok(BuiltinMetric::VpSource(source.to_string()));
        }

        if let Some(standing) = s.strip_prefix("built:") {
            let (tier, round) = standing.split_once('@').ok_or_else(unknown)?;
            let tier = BuildingTier::from_abbreviation(tier).ok_or_else(unknown)?;
            let round: usize = round.parse().map_err(|_| unknown())?;
            if round >= ROUND_COUNT {
                return Err(unknown());
            }
            return Ok(BuiltinMetric::Standing { tier, round });
        }

        Err(unknown())
    }
}

impl Metric for BuiltinMetric {
    fn name(&self) -> String {
        self.to_string()
    }

    fn evaluate(&self, record: &ParticipantRecord) -> Option<f64> {
        match self {
            BuiltinMetric::Score => Some(record.score),
            BuiltinMetric::Margin => Some(record.margin),
            BuiltinMetric::VpSource(source) => record.vp_sources.get(source).copied(),
            BuiltinMetric::Standing { tier, round } => record
                .buildings
                .at_round(*tier, *round)
                .map(f64::from),
        }
    }
}

/// Resolve configured metric names, keeping their order
///
/// Each metric may appear once; summaries key their entries by metric name.
pub fn parse_metrics<S: AsRef<str>>(names: &[S]) -> Result<MetricList, PoolError> {
    let mut seen = BTreeSet::new();
    let mut metrics = MetricList::with_capacity(names.len());
    for name in names {
        let metric = name.as_ref().parse::<BuiltinMetric>()?;
        if !seen.insert(metric.name()) {
            return Err(PoolError::DuplicateMetric(metric.name()));
        }
        metrics.push(Arc::new(metric));
    }
    Ok(metrics)
}

/// Names of a metric list, in order
pub fn metric_names(metrics: &[Arc<dyn Metric>]) -> Vec<String> {
    metrics.iter().map(|m| m.name()).collect()
}
