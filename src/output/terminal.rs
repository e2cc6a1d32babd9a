//! Terminal output rendering for runs and cohort lookups.

use crate::aggregator::{AggregationPool, Diagnostics};
use crate::stats::MomentAccumulator;
use colored::*;
use std::collections::BTreeMap;

const RULE: &str = "---------------------------------------------------\n";

/// Human-readable summary of a finished aggregation run
pub fn render_run_summary(
    pool: &AggregationPool,
    diagnostics: &Diagnostics,
    top: usize,
) -> String {
    let mut out = String::new();

    out.push('\n');
    out.push_str(&"Cohort Aggregation Summary".bold().to_string());
    out.push('\n');
    out.push_str(RULE);
    out.push_str(&render_counters(diagnostics));
    out.push_str(&format!("Cohorts:            {}\n", pool.len()));
    out.push_str(&format!("Metrics:            {}\n", pool.metric_names().join(", ")));
    out.push_str(RULE);
    out.push_str(&render_largest_cohorts(pool, top));
    out.push_str(&render_skips(diagnostics));

    out
}

fn render_counters(d: &Diagnostics) -> String {
    format!(
        "Matches listed:     {}\nParsed / cached:    {} / {}\nRecords absorbed:   {}\n",
        d.matches_seen, d.matches_parsed, d.matches_cached, d.records_absorbed
    )
}

fn render_largest_cohorts(pool: &AggregationPool, top: usize) -> String {
    let mut out = String::new();
    if pool.is_empty() || top == 0 {
        return out;
    }

    let mut cohorts: Vec<_> = pool
        .iter()
        .map(|(key, accs)| (key, accs.iter().map(|a| a.count()).max().unwrap_or(0), accs))
        .collect();
    cohorts.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    out.push_str(&format!("Largest {} cohorts:\n", top.min(cohorts.len())));
    let first_metric = pool.metric_names().into_iter().next().unwrap_or_default();
    for (key, n, accs) in cohorts.iter().take(top) {
        let mean = accs.first().map(|a| a.mean()).unwrap_or(0.0);
        out.push_str(&format!(
            "  {:<14} n={:<6} {} mean {:.1}\n",
            key.to_string(),
            n,
            first_metric,
            mean
        ));
    }
    out
}

fn render_skips(d: &Diagnostics) -> String {
    let mut out = String::new();
    let skipped = d.total_matches_skipped() + d.total_participants_skipped();

    if skipped == 0 && d.total_observations_dropped() == 0 {
        out.push_str(&"No matches or participants skipped".green().to_string());
        out.push('\n');
        return out;
    }

    out.push_str(&format!("{}\n", "Skipped:".yellow().bold()));
    for (reason, count) in &d.matches_skipped {
        out.push_str(&format!("  match {:<24} {}\n", reason, count));
    }
    for (reason, count) in &d.participants_skipped {
        out.push_str(&format!("  participant {:<18} {}\n", reason, count));
    }
    for (metric, count) in &d.observations_dropped {
        out.push_str(&format!("  observation {:<18} {}\n", metric, count));
    }
    out
}

/// Moments of one cohort, one block per metric
pub fn render_cohort(key: &str, metrics: &BTreeMap<String, MomentAccumulator>) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", "Cohort".bold(), key.cyan()));
    out.push_str(RULE);

    for (name, acc) in metrics {
        out.push_str(&format!("{}\n", name.bold()));
        out.push_str(&format!("  n         {}\n", acc.count()));
        out.push_str(&format!("  mean      {:.2}\n", acc.mean()));
        out.push_str(&format!("  std       {:.2}\n", acc.std()));
        out.push_str(&format!("  std err   {:.2}\n", acc.standard_error()));
        out.push_str(&format!("  skewness  {}\n", format_moment(acc.skewness().ok())));
        out.push_str(&format!("  kurtosis  {}\n", format_moment(acc.kurtosis().ok())));
    }
    out
}

/// One line placing `value` within a metric's distribution
pub fn render_z_score(metric: &str, value: f64, z: Option<f64>) -> String {
    match z {
        Some(z) => {
            let text = format!("{:+.2}", z);
            let shown = if z >= 1.0 {
                text.green()
            } else if z <= -1.0 {
                text.red()
            } else {
                text.normal()
            };
            format!("{} = {}: z-score {}\n", metric, value, shown)
        }
        None => format!(
            "{} = {}: {}\n",
            metric,
            value,
            "no spread in this cohort".yellow()
        ),
    }
}

fn format_moment(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.3}", v))
        .unwrap_or_else(|| "n/a".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::parse_metrics;
    use crate::cohort::CohortKeyBuilder;

    #[test]
    fn test_render_cohort_marks_degenerate_moments() {
        colored::control::set_override(false);
        let mut metrics = BTreeMap::new();
        metrics.insert("score".to_string(), [100.0].into_iter().collect());

        let out = render_cohort("s300000", &metrics);
        assert!(out.contains("Cohort s300000"));
        assert!(out.contains("n         1"));
        assert!(out.contains("skewness  n/a"));
    }

    #[test]
    fn test_render_run_summary_without_skips() {
        colored::control::set_override(false);
        let pool = AggregationPool::new(
            CohortKeyBuilder::default(),
            parse_metrics(&["score"]).unwrap(),
        );
        let out = render_run_summary(&pool, &Diagnostics::new(), 5);
        assert!(out.contains("Cohorts:            0"));
        assert!(out.contains("No matches or participants skipped"));
    }

    #[test]
    fn test_render_z_score() {
        colored::control::set_override(false);
        assert_eq!(render_z_score("score", 120.0, Some(1.5)), "score = 120: z-score +1.50\n");
        assert!(render_z_score("score", 1.0, None).contains("no spread"));
    }
}
