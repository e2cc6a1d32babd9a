//! Deterministic mapping from participant records to cohort keys.

use super::key::{milestone_digit, CohortKey, FavorSet, SkillTier};
use crate::parser::events::BuildingTier;
use crate::parser::faction::faction_token;
use crate::parser::ratings::{RatingSource, RatingTable};
use crate::parser::record::ParticipantRecord;
use crate::utils::config::{DEFAULT_OPENING_ROUND, MAX_PLAYERS};
use crate::utils::error::ParseError;
use std::fmt;
use std::sync::Arc;

/// Builds cohort keys from records
///
/// The builder holds only immutable configuration, so the same record and
/// configuration always produce the same key, on any shard and any run.
#[derive(Clone)]
pub struct CohortKeyBuilder {
    ratings: Arc<dyn RatingSource>,
    opening_round: u8,
}

impl fmt::Debug for CohortKeyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CohortKeyBuilder")
            .field("opening_round", &self.opening_round)
            .finish_non_exhaustive()
    }
}

impl Default for CohortKeyBuilder {
    fn default() -> Self {
        Self::new(Arc::new(RatingTable::empty()), DEFAULT_OPENING_ROUND)
    }
}

impl CohortKeyBuilder {
    pub fn new(ratings: Arc<dyn RatingSource>, opening_round: u8) -> Self {
        Self {
            ratings,
            opening_round,
        }
    }

    pub fn opening_round(&self) -> u8 {
        self.opening_round
    }

    /// Skill tier of the record's player with their faction
    pub fn skill_tier(&self, record: &ParticipantRecord) -> SkillTier {
        let rating = record
            .player
            .as_deref()
            .and_then(|player| self.ratings.rating(player, &record.faction));
        SkillTier::from_rating(rating)
    }

    /// Key for a record
    ///
    /// Missing milestones, favors and ratings map to their defaults; only an
    /// unknown faction or an unencodable player count is an error.
    pub fn build(&self, record: &ParticipantRecord) -> Result<CohortKey, ParseError> {
        let malformed = |reason: String| ParseError::MalformedRecord {
            match_id: record.match_id.clone(),
            participant: record.faction.clone(),
            reason,
        };

        let faction =
            faction_token(&record.faction).ok_or_else(|| malformed("unknown faction".to_string()))?;

        if !(1..=MAX_PLAYERS).contains(&record.player_count) {
            return Err(malformed(format!(
                "player count {} out of range",
                record.player_count
            )));
        }

        let mut milestones = [0; 4];
        for (slot, tier) in milestones.iter_mut().zip(BuildingTier::MILESTONES) {
            *slot = milestone_digit(record.milestone(tier));
        }

        let favors: FavorSet = record.favors_by_round(self.opening_round).collect();

        Ok(CohortKey {
            faction,
            player_count: record.player_count,
            tier: self.skill_tier(record),
            milestones,
            favors,
        })
    }
}
