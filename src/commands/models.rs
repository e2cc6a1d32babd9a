use crate::utils::config::{AggregationConfig, DEFAULT_OUTPUT_FILE};
use std::path::PathBuf;

/// Arguments for the aggregate command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateArgs {
    /// Resolved run settings (config file plus CLI overrides)
    pub config: AggregationConfig,

    /// Output path for the cohort summary
    pub output: PathBuf,

    /// Output path for the JSON run report (optional)
    pub report: Option<PathBuf>,

    /// Output path for the VP-by-source breakdown (optional)
    pub vp_output: Option<PathBuf>,

    /// Print text summary to stdout
    pub print_summary: bool,

    /// Cohorts listed in the text summary
    pub top_cohorts: usize,
}

impl Default for AggregateArgs {
    fn default() -> Self {
        Self {
            config: AggregationConfig::default(),
            output: PathBuf::from(DEFAULT_OUTPUT_FILE),
            report: None,
            vp_output: None,
            print_summary: false,
            top_cohorts: 10,
        }
    }
}

/// CLI values that override the config file when given
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub games_dir: Option<PathBuf>,
    pub game_list: Option<PathBuf>,
    pub ratings: Option<PathBuf>,
    pub cache: Option<PathBuf>,
    pub no_cache: bool,
    pub metrics: Vec<String>,
    pub opening_round: Option<u8>,
    pub shards: Option<usize>,
}

impl ConfigOverrides {
    /// Apply every value that was given on the command line
    pub fn apply(self, config: &mut AggregationConfig) {
        if let Some(dir) = self.games_dir {
            config.games_dir = dir;
        }
        if let Some(list) = self.game_list {
            config.game_list = list;
        }
        if let Some(ratings) = self.ratings {
            config.ratings = Some(ratings);
        }
        if let Some(cache) = self.cache {
            config.cache = Some(cache);
        }
        if self.no_cache {
            config.cache = None;
        }
        if !self.metrics.is_empty() {
            config.metrics = self.metrics;
        }
        if let Some(round) = self.opening_round {
            config.opening_round = round;
        }
        if let Some(shards) = self.shards {
            config.shards = shards;
        }
    }
}

/// Arguments for the lookup command
#[derive(Debug, Clone, PartialEq)]
pub struct LookupArgs {
    /// Summary JSON to read
    pub file: PathBuf,

    /// Cohort key string
    pub key: String,

    /// Restrict output to one metric
    pub metric: Option<String>,

    /// Value to place within the cohort distribution
    pub value: Option<f64>,
}
