//! Aggregate command implementation.
//!
//! The aggregate command:
//! 1. Loads the rating table
//! 2. Reads the game list
//! 3. Parses new matches into the parse cache
//! 4. Aggregates cohort moments (optionally sharded)
//! 5. Writes the summary and optional report files

use super::models::AggregateArgs;
use crate::aggregator::{aggregate_sharded, parse_metrics, VpSourceStats};
use crate::cohort::CohortKeyBuilder;
use crate::ingest::{read_game_list, Ingestor, ParseCache};
use crate::output::{render_run_summary, serialize, write_report, write_summary, RunReport};
use crate::output::json::write_json;
use crate::parser::ratings::RatingTable;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Execute the aggregate command
///
/// **Public** - main entry point called from main.rs
///
/// # Errors
/// * Unreadable or undecodable game list, ratings file or parse cache
/// * Unknown metric names
/// * File write errors
///
/// Individual bad matches or participants never fail the command; they are
/// counted in the returned report.
pub fn execute_aggregate(args: AggregateArgs) -> Result<RunReport> {
    execute_aggregate_until(args, Arc::new(AtomicBool::new(false)))
}

/// Execute the aggregate command, stopping the refresh when `stop` is set
///
/// A stopped run keeps the matches parsed so far in the cache but writes no
/// summary.
pub fn execute_aggregate_until(args: AggregateArgs, stop: Arc<AtomicBool>) -> Result<RunReport> {
    let start_time = Instant::now();
    let config = &args.config;

    let metrics = parse_metrics(&config.metrics).context("Invalid metric configuration")?;

    info!("Step 1/5: Loading ratings...");
    let ratings = RatingTable::load_or_empty(config.ratings.as_deref())
        .context("Failed to load ratings file")?;
    debug!("Ratings loaded for {} players", ratings.len());

    info!("Step 2/5: Reading game list {}...", config.game_list.display());
    let match_ids = read_game_list(&config.game_list).context("Failed to read game list")?;

    info!("Step 3/5: Refreshing parse cache...");
    let mut cache =
        ParseCache::open_optional(config.cache.as_deref()).context("Failed to open parse cache")?;
    let ingestor = Ingestor::new(&config.games_dir).with_stop(stop);
    let refresh = ingestor
        .refresh(&match_ids, &mut cache)
        .context("Failed to refresh parse cache")?;

    if refresh.cancelled {
        anyhow::bail!(
            "Aggregation interrupted; {} matches are cached, rerun to resume",
            cache.len()
        );
    }

    info!(
        "Step 4/5: Aggregating {} metrics on {} shard(s)...",
        metrics.len(),
        config.shards
    );
    let records: Vec<_> = cache.records_for(&match_ids).collect();
    let builder = CohortKeyBuilder::new(Arc::new(ratings), config.opening_round);
    let pool = aggregate_sharded(&records, config.shards, &builder, &metrics)
        .context("Failed to combine shard results")?;
    info!("Aggregated {} records into {} cohorts", records.len(), pool.len());

    info!("Step 5/5: Writing output files...");
    let summary = serialize(&pool);
    write_summary(&summary, &args.output).context("Failed to write summary JSON")?;
    info!("✓ Summary written to: {}", args.output.display());

    let report = RunReport::new(&pool, &refresh.diagnostics);

    if let Some(report_path) = &args.report {
        write_report(&report, report_path).context("Failed to write run report")?;
        info!("✓ Run report written to: {}", report_path.display());
    }

    if let Some(vp_path) = &args.vp_output {
        let mut vp_stats = VpSourceStats::new();
        vp_stats.absorb_all(records.iter().copied());
        if vp_stats.rejected() > 0 {
            warn!("{} VP source values were not finite and were left out", vp_stats.rejected());
        }
        write_json(&vp_stats.to_summary(), vp_path)
            .context("Failed to write VP source breakdown")?;
        info!("✓ VP source breakdown written to: {}", vp_path.display());
    }

    if args.print_summary {
        println!(
            "{}",
            render_run_summary(&pool, &report.diagnostics, args.top_cohorts)
        );
    }

    let elapsed = start_time.elapsed();
    info!("Aggregation completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Install a Ctrl-C handler that raises the returned stop flag
///
/// The first interrupt lets the current match finish and the cache be
/// saved; a second one exits immediately. Only one handler can be installed
/// per process.
pub fn install_interrupt_handler() -> Result<Arc<AtomicBool>> {
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);
    ctrlc::set_handler(move || {
        if flag.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        warn!("Interrupted, saving the parse cache (press Ctrl-C again to abort)");
    })
    .context("Failed to install Ctrl-C handler")?;
    Ok(stop)
}

/// Validate aggregate arguments
///
/// **Public** - can be called before execute_aggregate for early validation
pub fn validate_args(args: &AggregateArgs) -> Result<()> {
    args.config.validate().context("Invalid configuration")?;

    parse_metrics(&args.config.metrics).context("Invalid metric configuration")?;

    if args.output.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if !args.config.games_dir.is_dir() {
        anyhow::bail!(
            "Games directory does not exist: {}",
            args.config.games_dir.display()
        );
    }

    if args.print_summary && args.top_cohorts == 0 {
        anyhow::bail!("top_cohorts must be greater than 0");
    }

    Ok(())
}
