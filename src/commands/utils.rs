use crate::cohort::CohortKey;
use crate::output::{read_summary, SerializedMoments, Summary};
use crate::utils::config::{SCHEMA_VERSION, SCORE_SCALE};
use anyhow::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Validate a summary JSON file
pub fn validate_summary_file(file_path: PathBuf) -> Result<()> {
    println!("Validating summary: {}", file_path.display());

    let summary = read_summary(&file_path)?;
    let problems = check_summary(&summary);

    if !problems.is_empty() {
        for problem in &problems {
            println!("✗ {}", problem);
        }
        anyhow::bail!("Summary has {} problem(s)", problems.len());
    }

    let metrics: BTreeSet<&str> = summary
        .values()
        .flat_map(|m| m.keys().map(String::as_str))
        .collect();
    let observations: u64 = summary
        .values()
        .flat_map(|m| m.values())
        .map(SerializedMoments::count)
        .sum();

    println!("✓ Valid summary JSON");
    println!("  Cohorts: {}", summary.len());
    println!("  Metrics: {}", metrics.into_iter().collect::<Vec<_>>().join(", "));
    println!("  Observations: {}", observations);

    Ok(())
}

/// Structural problems in a summary: unparsable keys, impossible moments
pub fn check_summary(summary: &Summary) -> Vec<String> {
    let mut problems = Vec::new();

    for (key, metrics) in summary {
        if let Err(e) = key.parse::<CohortKey>() {
            problems.push(e.to_string());
        }
        for (name, moments) in metrics {
            if let SerializedMoments::Full(n, _, m2, _, m4) = moments {
                if *n == 1 {
                    problems.push(format!(
                        "{} / {}: single observation stored as array",
                        key, name
                    ));
                }
                if *m2 < 0 || *m4 < 0 {
                    problems.push(format!("{} / {}: negative even moment", key, name));
                }
            }
        }
    }

    problems
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Cohortstat Summary Schema");
    println!("Current Version: {}", SCHEMA_VERSION);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  <cohort key>: object      - One entry per cohort");
        println!(
            "    <metric>: number        - Single observation: round(mean * {})",
            SCORE_SCALE
        );
        println!(
            "    <metric>: array[5]      - [n, M1, M2, M3, M4], each moment * {}",
            SCORE_SCALE
        );
        println!();
        println!("Cohort key: <faction><players><tier><tp><te><sa><sh><favors...>");
        println!("  faction: char             - a..t, one per faction in alphabetical order");
        println!("  players: digit            - Seats in the match (1-9)");
        println!("  tier: digit               - 0 unknown, 1..4 rating band");
        println!("  tp/te/sa/sh: digit        - 0 never built, otherwise first round + 1");
        println!("  favors: hex digits        - Opening favor tiles (1..c), ascending");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Cohortstat v{}", env!("CARGO_PKG_VERSION"));
    println!("Summary Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Single-pass cohort moment statistics for Terra Mystica match logs.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_check_summary() {
        let mut good = BTreeMap::new();
        good.insert("score".to_string(), SerializedMoments::Full(3, 1000, 200, 0, 40));
        let mut bad = BTreeMap::new();
        bad.insert("score".to_string(), SerializedMoments::Full(1, 1000, -5, 0, 0));

        let mut summary = Summary::new();
        summary.insert("a200000".to_string(), good.clone());
        assert!(check_summary(&summary).is_empty());

        summary.insert("a200000x".to_string(), good);
        summary.insert("b2000001".to_string(), bad);
        assert_eq!(check_summary(&summary).len(), 3);
    }
}
