//! Sharded aggregation over scoped worker threads.

use super::metrics::MetricList;
use super::pool::AggregationPool;
use crate::cohort::CohortKeyBuilder;
use crate::parser::record::ParticipantRecord;
use crate::utils::error::PoolError;
use log::debug;
use std::borrow::Borrow;
use std::thread;

/// Aggregate records on `shards` threads and reduce into one pool
///
/// Records are split into contiguous chunks, each folded into its own pool,
/// then merged on the calling thread in chunk order. Records may be owned
/// or borrowed. A shard count of 0 or 1 runs sequentially.
pub fn aggregate_sharded<R>(
    records: &[R],
    shards: usize,
    builder: &CohortKeyBuilder,
    metrics: &MetricList,
) -> Result<AggregationPool, PoolError>
where
    R: Borrow<ParticipantRecord> + Sync,
{
    let mut reduced = AggregationPool::new(builder.clone(), metrics.clone());

    if shards <= 1 || records.len() < 2 {
        reduced.absorb_all(records.iter().map(<R as Borrow<ParticipantRecord>>::borrow));
        return Ok(reduced);
    }

    let chunk_size = records.len().div_ceil(shards);
    debug!(
        "Aggregating {} records on {} shards of up to {}",
        records.len(),
        shards,
        chunk_size
    );

    let pools: Vec<AggregationPool> = thread::scope(|scope| {
        let handles: Vec<_> = records
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    let mut pool = AggregationPool::new(builder.clone(), metrics.clone());
                    pool.absorb_all(chunk.iter().map(<R as Borrow<ParticipantRecord>>::borrow));
                    pool
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    });

    for pool in pools {
        reduced.merge(pool)?;
    }

    Ok(reduced)
}
