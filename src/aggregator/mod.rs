//! Aggregation of participant records into per-cohort moments.
//!
//! This module turns extracted records into:
//! - Metric observations (score, margin, VP by source, building counts)
//! - One moment accumulator per cohort and metric
//! - Pass diagnostics (skips and dropped observations)
//! - A VP-by-source breakdown, overall and per faction

pub mod diagnostics;
pub mod metrics;
pub mod pool;
pub mod shard;
pub mod vp_sources;

// Re-export main types and functions
pub use diagnostics::Diagnostics;
pub use metrics::{metric_names, parse_metrics, BuiltinMetric, Metric, MetricList};
pub use pool::AggregationPool;
pub use shard::aggregate_sharded;
pub use vp_sources::{VpSourceStats, VpSourceSummary};
