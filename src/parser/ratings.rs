//! External player ratings.
//!
//! Ratings are an injected dependency: the key builder asks a
//! [`RatingSource`] for a player's score with a faction and treats a
//! missing answer as "unknown".

use crate::utils::error::ConfigError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// Lookup of a continuous rating score per player and faction
pub trait RatingSource: Send + Sync {
    fn rating(&self, player: &str, faction: &str) -> Option<f64>;
}

/// Ratings JSON: `{"players": {user: {"faction_breakdown": {faction: {"score": x}}}}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RatingTable {
    #[serde(default)]
    players: HashMap<String, PlayerRatings>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct PlayerRatings {
    #[serde(default)]
    faction_breakdown: HashMap<String, FactionRating>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct FactionRating {
    score: f64,
}

impl RatingTable {
    /// Table with no entries; every lookup is unknown
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a ratings document
    pub fn from_json_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(contents)?)
    }

    /// Load a ratings file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let table = Self::from_json_str(&contents)?;
        debug!("Loaded ratings for {} players from {}", table.len(), path.display());
        Ok(table)
    }

    /// Load a ratings file, falling back to an empty table when the path is
    /// unset or the file does not exist
    pub fn load_or_empty(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            info!("No ratings file configured, all skill tiers are unknown");
            return Ok(Self::empty());
        };

        match Self::load(path) {
            Err(ConfigError::ReadFailed(e)) if e.kind() == ErrorKind::NotFound => {
                info!(
                    "Ratings file {} not found, all skill tiers are unknown",
                    path.display()
                );
                Ok(Self::empty())
            }
            other => other,
        }
    }

    /// Add or replace one rating
    pub fn insert(&mut self, player: &str, faction: &str, score: f64) {
        self.players
            .entry(player.to_string())
            .or_default()
            .faction_breakdown
            .insert(faction.to_string(), FactionRating { score });
    }

    /// Number of rated players
    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

impl RatingSource for RatingTable {
    fn rating(&self, player: &str, faction: &str) -> Option<f64> {
        self.players
            .get(player)?
            .faction_breakdown
            .get(faction)
            .map(|r| r.score)
    }
}
