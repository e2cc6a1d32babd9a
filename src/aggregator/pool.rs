//! Keyed moment accumulation over cohorts.

use super::diagnostics::Diagnostics;
use super::metrics::{metric_names, MetricList};
use crate::cohort::{CohortKey, CohortKeyBuilder};
use crate::parser::record::ParticipantRecord;
use crate::stats::MomentAccumulator;
use crate::utils::error::{ParseError, PoolError};
use log::{debug, warn};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::fmt;

/// Cohort key to one accumulator per configured metric
///
/// Cohorts are created on first observation. Every accumulator vector has
/// exactly one slot per metric, in metric order.
pub struct AggregationPool {
    builder: CohortKeyBuilder,
    metrics: MetricList,
    cohorts: BTreeMap<CohortKey, Vec<MomentAccumulator>>,
    diagnostics: Diagnostics,
}

impl fmt::Debug for AggregationPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregationPool")
            .field("metrics", &self.metric_names())
            .field("cohorts", &self.cohorts.len())
            .finish_non_exhaustive()
    }
}

impl AggregationPool {
    pub fn new(builder: CohortKeyBuilder, metrics: MetricList) -> Self {
        Self {
            builder,
            metrics,
            cohorts: BTreeMap::new(),
            diagnostics: Diagnostics::new(),
        }
    }

    /// Fold one record into its cohort
    ///
    /// A record whose key cannot be built is counted and returned as an
    /// error; the pool is left unchanged. A metric that yields nothing (or a
    /// non-finite value) drops only that metric's observation.
    pub fn absorb(&mut self, record: &ParticipantRecord) -> Result<(), ParseError> {
        let key = match self.builder.build(record) {
            Ok(key) => key,
            Err(e) => {
                self.diagnostics.skip_participant(e.kind());
                return Err(e);
            }
        };

        let slots = self.metrics.len();
        let accumulators = match self.cohorts.entry(key) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                debug!("New cohort {}", entry.key());
                entry.insert(vec![MomentAccumulator::new(); slots])
            }
        };

        for (metric, acc) in self.metrics.iter().zip(accumulators.iter_mut()) {
            let accepted = metric
                .evaluate(record)
                .map(|value| acc.incorporate(value).is_ok())
                .unwrap_or(false);
            if !accepted {
                self.diagnostics.drop_observation(&metric.name());
            }
        }

        self.diagnostics.records_absorbed += 1;
        Ok(())
    }

    /// Fold every record, skipping (and logging) those without a key
    pub fn absorb_all<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a ParticipantRecord>,
    {
        for record in records {
            if let Err(e) = self.absorb(record) {
                warn!("Skipping record: {}", e);
            }
        }
    }

    /// Combine another pool into this one
    ///
    /// Both pools must aggregate the same metrics in the same order.
    pub fn merge(&mut self, other: AggregationPool) -> Result<(), PoolError> {
        let expected = self.metric_names();
        let found = other.metric_names();
        if expected != found {
            return Err(PoolError::MetricMismatch {
                expected: expected.join(", "),
                found: found.join(", "),
            });
        }

        for (key, theirs) in other.cohorts {
            match self.cohorts.entry(key) {
                Entry::Occupied(mut entry) => {
                    for (mine, theirs) in entry.get_mut().iter_mut().zip(&theirs) {
                        mine.merge_from(theirs);
                    }
                }
                Entry::Vacant(entry) => {
                    entry.insert(theirs);
                }
            }
        }

        self.diagnostics.merge(&other.diagnostics);
        Ok(())
    }

    pub fn get(&self, key: &CohortKey) -> Option<&[MomentAccumulator]> {
        self.cohorts.get(key).map(Vec::as_slice)
    }

    /// Accumulator for one metric of one cohort
    pub fn get_metric(&self, key: &CohortKey, metric: &str) -> Option<&MomentAccumulator> {
        let index = self.metrics.iter().position(|m| m.name() == metric)?;
        self.cohorts.get(key).map(|accs| &accs[index])
    }

    /// Number of cohorts
    pub fn len(&self) -> usize {
        self.cohorts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cohorts.is_empty()
    }

    /// Cohorts in key order
    pub fn iter(&self) -> impl Iterator<Item = (&CohortKey, &[MomentAccumulator])> {
        self.cohorts.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn metric_names(&self) -> Vec<String> {
        metric_names(&self.metrics)
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn builder(&self) -> &CohortKeyBuilder {
        &self.builder
    }

    pub fn metrics(&self) -> &MetricList {
        &self.metrics
    }
}
