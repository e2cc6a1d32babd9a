//! Feature extraction from snellman match JSON.
//!
//! Turns one match document into participant records. Match-level problems
//! (aborted, placeholder seats, undecodable JSON) reject the whole match;
//! participant-level problems only reject that participant.

use super::events::{favor_rounds, first_round, BuildingProgress, BuildingTier};
use super::faction::{faction_token, is_placeholder_slot};
use super::record::ParticipantRecord;
use super::schema::{has_field, is_truthy, RawEventLog, RawFaction, RawMatch, DROPPED_KEY};
use crate::utils::config::MAX_PLAYERS;
use crate::utils::error::{CountOutOfRange, ParseError};
use log::{debug, warn};

/// Records extracted from one match, plus the participants that were rejected
#[derive(Debug, Default)]
pub struct MatchExtraction {
    pub records: Vec<ParticipantRecord>,
    pub rejected: Vec<ParseError>,
    /// Participants that left the match early (skipped, not an error)
    pub dropped: usize,
}

/// Converts one raw match into per-participant feature records
pub trait FeatureExtractor: Send + Sync {
    fn extract(
        &self,
        match_id: &str,
        raw: &serde_json::Value,
    ) -> Result<MatchExtraction, ParseError>;
}

/// Extractor for the snellman Terra Mystica match format
#[derive(Debug, Clone, Copy, Default)]
pub struct SnellmanExtractor;

impl FeatureExtractor for SnellmanExtractor {
    fn extract(
        &self,
        match_id: &str,
        raw: &serde_json::Value,
    ) -> Result<MatchExtraction, ParseError> {
        let game: RawMatch = serde_json::from_value(raw.clone())?;

        if is_truthy(&game.aborted) {
            return Err(ParseError::Aborted(match_id.to_string()));
        }

        if let Some(slot) = game.factions.keys().find(|name| is_placeholder_slot(name)) {
            return Err(ParseError::IncompleteParticipants {
                match_id: match_id.to_string(),
                slot: slot.clone(),
            });
        }

        debug!(
            "Match {}: {} factions, {} match-level event kinds",
            match_id,
            game.factions.len(),
            game.events.all.len()
        );

        let player_count = game
            .player_count
            .unwrap_or(game.factions.len().min(u8::MAX as usize) as u8);

        if !(1..=MAX_PLAYERS).contains(&player_count) {
            return Err(ParseError::MalformedRecord {
                match_id: match_id.to_string(),
                participant: "*".to_string(),
                reason: format!("player count {} out of range", player_count),
            });
        }

        let mut extraction = MatchExtraction::default();

        for (name, value) in &game.factions {
            match extract_participant(match_id, name, value, &game, player_count) {
                Ok(Some(record)) => extraction.records.push(record),
                Ok(None) => extraction.dropped += 1,
                Err(e) => {
                    warn!("{}", e);
                    extraction.rejected.push(e);
                }
            }
        }

        fill_margins(&mut extraction.records);

        Ok(extraction)
    }
}

/// Build one record; `Ok(None)` for a participant who dropped out
fn extract_participant(
    match_id: &str,
    name: &str,
    value: &serde_json::Value,
    game: &RawMatch,
    player_count: u8,
) -> Result<Option<ParticipantRecord>, ParseError> {
    let malformed = |reason: String| ParseError::MalformedRecord {
        match_id: match_id.to_string(),
        participant: name.to_string(),
        reason,
    };

    if has_field(value, DROPPED_KEY) {
        debug!("Match {}: {} dropped out, skipping", match_id, name);
        return Ok(None);
    }

    if !has_field(value, "username") {
        return Err(malformed("no username entry".to_string()));
    }

    let faction: RawFaction =
        serde_json::from_value(value.clone()).map_err(|e| malformed(e.to_string()))?;

    if faction_token(name).is_none() {
        return Err(malformed("unknown faction".to_string()));
    }

    if !faction.vp.is_finite() {
        return Err(malformed(format!("non-finite VP {}", faction.vp)));
    }

    let events_value = game
        .events
        .faction
        .get(name)
        .ok_or_else(|| malformed("no event log".to_string()))?;
    let events: RawEventLog = serde_json::from_value(events_value.clone())
        .map_err(|e| malformed(format!("bad event log: {}", e)))?;

    let bad_count = |e: CountOutOfRange| malformed(e.to_string());

    let mut milestones = [None; 4];
    for (slot, tier) in milestones.iter_mut().zip(BuildingTier::MILESTONES) {
        *slot = first_round(&events, tier.event_name()).map_err(bad_count)?;
    }
    let buildings = BuildingProgress::from_events(&events).map_err(bad_count)?;
    let favors = favor_rounds(&events).map_err(bad_count)?;

    Ok(Some(ParticipantRecord {
        match_id: match_id.to_string(),
        faction: name.to_string(),
        player: faction.username,
        player_count,
        score: faction.vp,
        margin: 0.0,
        vp_sources: faction.vp_source,
        buildings,
        milestones,
        favors,
    }))
}

/// Set each record's margin against the mean score of the accepted records
fn fill_margins(records: &mut [ParticipantRecord]) {
    if records.is_empty() {
        return;
    }
    let mean = records.iter().map(|r| r.score).sum::<f64>() / records.len() as f64;
    for record in records {
        record.margin = record.score - mean;
    }
}
