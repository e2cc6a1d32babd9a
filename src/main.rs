//! Cohortstat CLI
//!
//! Single-pass cohort statistics for Terra Mystica match logs.
//! Aggregates score moments per cohort and looks cohorts up again.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use cohortstat::commands::{
    display_schema, display_version, execute_aggregate_until, execute_lookup,
    install_interrupt_handler, validate_args, validate_summary_file, AggregateArgs,
    ConfigOverrides, LookupArgs,
};
use cohortstat::utils::config::{AggregationConfig, DEFAULT_OUTPUT_FILE};

/// Cohortstat - cohort moment statistics for Terra Mystica matches
#[derive(Parser, Debug)]
#[command(name = "cohortstat")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse new matches and aggregate cohort moments
    Aggregate {
        /// TOML config file (CLI flags override its values)
        #[arg(short, long, env = "COHORTSTAT_CONFIG")]
        config: Option<PathBuf>,

        /// Directory holding <match id>.json files
        #[arg(short, long)]
        games: Option<PathBuf>,

        /// JSON array of match ids to process
        #[arg(short, long)]
        list: Option<PathBuf>,

        /// Ratings JSON file
        #[arg(long)]
        ratings: Option<PathBuf>,

        /// Parse cache file
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Do not read or write the parse cache
        #[arg(long, conflicts_with = "cache")]
        no_cache: bool,

        /// Metric to aggregate (repeatable): score, margin, vp:<source>, built:<TIER>@<round>
        #[arg(short, long = "metric")]
        metrics: Vec<String>,

        /// Last round whose favor tiles go into the cohort key
        #[arg(long)]
        opening_round: Option<u8>,

        /// Number of aggregation shards
        #[arg(long)]
        shards: Option<usize>,

        /// Output path for the cohort summary
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        output: PathBuf,

        /// Output path for the JSON run report
        #[arg(long)]
        report: Option<PathBuf>,

        /// Output path for the VP-by-source breakdown
        #[arg(long)]
        vp_output: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,

        /// Cohorts listed in the text summary
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Print the moments of one cohort
    Lookup {
        /// Path to summary JSON file
        #[arg(short, long, default_value = DEFAULT_OUTPUT_FILE)]
        file: PathBuf,

        /// Cohort key (e.g. i4223454a)
        #[arg(short, long)]
        key: String,

        /// Only show this metric
        #[arg(short, long)]
        metric: Option<String>,

        /// Print the z-score of this value
        #[arg(long, allow_hyphen_values = true)]
        value: Option<f64>,
    },

    /// Validate a summary JSON file
    Validate {
        /// Path to summary JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Aggregate {
            config,
            games,
            list,
            ratings,
            cache,
            no_cache,
            metrics,
            opening_round,
            shards,
            output,
            report,
            vp_output,
            summary,
            top,
        } => {
            let mut resolved = match &config {
                Some(path) => AggregationConfig::load(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => AggregationConfig::default(),
            };

            ConfigOverrides {
                games_dir: games,
                game_list: list,
                ratings,
                cache,
                no_cache,
                metrics,
                opening_round,
                shards,
            }
            .apply(&mut resolved);

            let args = AggregateArgs {
                config: resolved,
                output,
                report,
                vp_output,
                print_summary: summary,
                top_cohorts: top,
            };

            // Validate args first
            validate_args(&args)?;

            let stop = install_interrupt_handler()?;
            execute_aggregate_until(args, stop)?;
        }

        Commands::Lookup {
            file,
            key,
            metric,
            value,
        } => {
            execute_lookup(LookupArgs {
                file,
                key,
                metric,
                value,
            })?;
        }

        Commands::Validate { file } => {
            validate_summary_file(file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
