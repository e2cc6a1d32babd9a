//! Participant feature records.

use super::events::{BuildingProgress, BuildingTier};
use crate::utils::config::FAVOR_TILE_COUNT;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Everything the aggregation pass needs to know about one participant
/// in one match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    /// Match the participant played in
    pub match_id: String,

    /// Faction name (always a known faction)
    pub faction: String,

    /// Player name, if the seat was not anonymous
    pub player: Option<String>,

    /// Seats in the match
    pub player_count: u8,

    /// Final victory points
    pub score: f64,

    /// Score minus the mean score of the match
    pub margin: f64,

    /// Victory points by source
    pub vp_sources: BTreeMap<String, f64>,

    /// Standing structures per round
    pub buildings: BuildingProgress,

    /// First round each of [`BuildingTier::MILESTONES`] was reached
    pub milestones: [Option<u8>; 4],

    /// Round each favor tile FAV1..FAV12 was taken in
    pub favors: [Option<u8>; FAVOR_TILE_COUNT],
}

impl ParticipantRecord {
    /// First round a tier was reached; dwellings are always present from setup
    pub fn milestone(&self, tier: BuildingTier) -> Option<u8> {
        BuildingTier::MILESTONES
            .iter()
            .position(|&t| t == tier)
            .and_then(|i| self.milestones[i])
            .or(if tier == BuildingTier::Dwelling { Some(0) } else { None })
    }

    /// Favor tiles (1-based) taken in play rounds `1..=round`
    pub fn favors_by_round(&self, round: u8) -> impl Iterator<Item = u8> + '_ {
        self.favors
            .iter()
            .enumerate()
            .filter(move |(_, r)| matches!(r, Some(r) if (1..=round).contains(r)))
            .map(|(i, _)| i as u8 + 1)
    }
}
