//! Configuration and constants.

use crate::utils::error::ConfigError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Current summary schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Rounds tracked per match: round 0 is the setup phase, 1..=6 are play rounds
pub const ROUND_COUNT: usize = 7;

/// Fixed-point scale applied to every serialized moment
pub const SCORE_SCALE: f64 = 10.0;

/// Half-width of the central rating bands used for skill tiers
pub const TIER_BAND: f64 = 37.0;

/// Largest seat count a cohort key can encode (one digit)
pub const MAX_PLAYERS: u8 = 9;

/// Number of favor tiles (FAV1..FAV12)
pub const FAVOR_TILE_COUNT: usize = 12;

/// Metrics aggregated when none are configured
pub const DEFAULT_METRICS: &[&str] = &["score", "margin"];

/// Highest round whose favor picks count towards the cohort key by default
pub const DEFAULT_OPENING_ROUND: u8 = 1;

// Default file locations, relative to the working directory
pub const DEFAULT_GAMES_DIR: &str = "games";
pub const DEFAULT_GAME_LIST: &str = "gamelist.json";
pub const DEFAULT_CACHE_FILE: &str = "games.cache.json";
pub const DEFAULT_RATINGS_FILE: &str = "ratings.json";
pub const DEFAULT_OUTPUT_FILE: &str = "stats.json";

/// Settings for one aggregation run, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationConfig {
    /// Metric names, in output order (see `aggregator::metrics`)
    pub metrics: Vec<String>,

    /// Favor tiles taken in rounds `1..=opening_round` go into the key
    pub opening_round: u8,

    /// Number of shards for the aggregation pass
    pub shards: usize,

    /// Directory holding `<match id>.json` files
    pub games_dir: PathBuf,

    /// JSON array of match ids to process
    pub game_list: PathBuf,

    /// Optional rating table
    pub ratings: Option<PathBuf>,

    /// Incremental parse cache
    pub cache: Option<PathBuf>,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            metrics: DEFAULT_METRICS.iter().map(|m| m.to_string()).collect(),
            opening_round: DEFAULT_OPENING_ROUND,
            shards: 1,
            games_dir: PathBuf::from(DEFAULT_GAMES_DIR),
            game_list: PathBuf::from(DEFAULT_GAME_LIST),
            ratings: Some(PathBuf::from(DEFAULT_RATINGS_FILE)),
            cache: Some(PathBuf::from(DEFAULT_CACHE_FILE)),
        }
    }
}

impl AggregationConfig {
    /// Parse a config from TOML text; missing keys take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: AggregationConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!("Loading aggregation config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.metrics.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one metric is required".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        if let Some(repeated) = self.metrics.iter().find(|m| !seen.insert(m.as_str())) {
            return Err(ConfigError::Invalid(format!(
                "metric {} is listed more than once",
                repeated
            )));
        }
        if self.shards == 0 {
            return Err(ConfigError::Invalid("shards must be at least 1".to_string()));
        }
        if usize::from(self.opening_round) >= ROUND_COUNT {
            return Err(ConfigError::Invalid(format!(
                "opening_round must be below {}",
                ROUND_COUNT
            )));
        }
        Ok(())
    }
}
