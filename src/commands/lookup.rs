//! Lookup command: print one cohort's moments from a summary file.

use super::models::LookupArgs;
use crate::cohort::CohortKey;
use crate::output::{read_summary, render_cohort, render_z_score};
use crate::stats::MomentAccumulator;
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// Execute the lookup command
///
/// # Errors
/// * Unreadable summary file
/// * Key that does not parse, or is not in the summary
/// * Metric not present for the cohort
pub fn execute_lookup(args: LookupArgs) -> Result<()> {
    let metrics = lookup_cohort(&args)?;

    print!("{}", render_cohort(&args.key, &metrics));

    if let Some(value) = args.value {
        for (name, acc) in &metrics {
            println!("{}", render_z_score(name, value, acc.z_score(value).ok()).trim_end());
        }
    }

    Ok(())
}

/// Resolve the accumulators a lookup asks for
///
/// **Public** - shared with tests
pub fn lookup_cohort(args: &LookupArgs) -> Result<BTreeMap<String, MomentAccumulator>> {
    let key: CohortKey = args
        .key
        .parse()
        .with_context(|| format!("Invalid cohort key '{}'", args.key))?;

    let summary = read_summary(&args.file)
        .with_context(|| format!("Failed to read summary {}", args.file.display()))?;

    let cohort = summary
        .get(&key.to_string())
        .with_context(|| format!("Cohort {} not found in summary", key))?;

    let metrics: BTreeMap<String, MomentAccumulator> = cohort
        .iter()
        .filter(|(name, _)| args.metric.as_deref().map_or(true, |m| m == name.as_str()))
        .map(|(name, moments)| (name.clone(), moments.to_accumulator()))
        .collect();

    if let Some(metric) = &args.metric {
        if metrics.is_empty() {
            anyhow::bail!("Metric '{}' not found for cohort {}", metric, key);
        }
    }

    Ok(metrics)
}
