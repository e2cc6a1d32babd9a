//! Batch ingest driver.
//!
//! Walks the game list, parses every match not already in the parse cache,
//! and records what was skipped and why. Matches are independent: one bad
//! document never stops the batch.

pub mod cache;
pub mod games;

pub use cache::ParseCache;
pub use games::{load_match, match_path, read_game_list, MatchDocument};

use crate::aggregator::Diagnostics;
use crate::parser::extractor::{FeatureExtractor, SnellmanExtractor};
use crate::utils::error::IngestError;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Result of one refresh over the game list
#[derive(Debug, Default)]
pub struct RefreshOutcome {
    pub diagnostics: Diagnostics,
    /// The stop flag was raised before every match was visited
    pub cancelled: bool,
}

/// Parses new matches into a [`ParseCache`]
pub struct Ingestor {
    games_dir: PathBuf,
    extractor: Arc<dyn FeatureExtractor>,
    stop: Arc<AtomicBool>,
}

impl Ingestor {
    pub fn new(games_dir: impl Into<PathBuf>) -> Self {
        Self::with_extractor(games_dir, Arc::new(SnellmanExtractor))
    }

    pub fn with_extractor(
        games_dir: impl Into<PathBuf>,
        extractor: Arc<dyn FeatureExtractor>,
    ) -> Self {
        Self {
            games_dir: games_dir.into(),
            extractor,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an existing stop flag
    pub fn with_stop(mut self, stop: Arc<AtomicBool>) -> Self {
        self.stop = stop;
        self
    }

    /// Flag that stops the refresh loop before the next match when set
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Parse every listed match missing from the cache, then save the cache
    ///
    /// The cache is saved even when the refresh is cancelled, so the work
    /// done so far is kept for the next run.
    pub fn refresh(
        &self,
        match_ids: &[String],
        cache: &mut ParseCache,
    ) -> Result<RefreshOutcome, IngestError> {
        let mut outcome = RefreshOutcome::default();
        let diagnostics = &mut outcome.diagnostics;

        for (index, match_id) in match_ids.iter().enumerate() {
            if self.stop.load(Ordering::Relaxed) {
                info!(
                    "Refresh cancelled after {} of {} matches",
                    index,
                    match_ids.len()
                );
                outcome.cancelled = true;
                break;
            }

            diagnostics.matches_seen += 1;

            if cache.contains(match_id) {
                diagnostics.matches_cached += 1;
                continue;
            }

            self.parse_one(match_id, cache, diagnostics);
        }

        info!(
            "Refresh done: {} parsed, {} cached, {} skipped",
            outcome.diagnostics.matches_parsed,
            outcome.diagnostics.matches_cached,
            outcome.diagnostics.total_matches_skipped()
        );

        cache.save()?;
        Ok(outcome)
    }

    fn parse_one(&self, match_id: &str, cache: &mut ParseCache, diagnostics: &mut Diagnostics) {
        let raw = match load_match(&self.games_dir, match_id) {
            MatchDocument::Loaded(raw) => raw,
            MatchDocument::Missing => {
                debug!("Match {} has no file, skipping", match_id);
                diagnostics.skip_match("missing");
                return;
            }
            MatchDocument::Unreadable(e) => {
                warn!("Match {} could not be read: {}", match_id, e);
                diagnostics.skip_match("unreadable");
                return;
            }
            MatchDocument::Invalid(e) => {
                warn!("Match {} has an error in its JSON: {}", match_id, e);
                diagnostics.skip_match("invalid_json");
                return;
            }
        };

        debug!("Parsing {}...", match_id);
        let extraction = match self.extractor.extract(match_id, &raw) {
            Ok(extraction) => extraction,
            Err(e) => {
                debug!("Skipping match {}: {}", match_id, e);
                diagnostics.skip_match(e.kind());
                return;
            }
        };

        diagnostics.participants_dropped += extraction.dropped as u64;
        for rejected in &extraction.rejected {
            diagnostics.skip_participant(rejected.kind());
        }

        if cache.insert(match_id, extraction.records) {
            diagnostics.matches_parsed += 1;
        } else {
            diagnostics.skip_match("no_records");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write_match(dir: &std::path::Path, id: &str, value: serde_json::Value) {
        fs::write(match_path(dir, id), value.to_string()).unwrap();
    }

    fn one_faction_match() -> serde_json::Value {
        json!({
            "aborted": false,
            "factions": {
                "witches": { "username": "ann", "VP": 100, "vp_source": {"faction": 12} }
            },
            "events": {
                "faction": {
                    "witches": { "build:D": {"round": {"0": 2, "all": 2}} }
                }
            }
        })
    }

    #[test]
    fn test_refresh_counts_outcomes() {
        let dir = tempfile::tempdir().unwrap();
        write_match(dir.path(), "ok", one_faction_match());
        write_match(dir.path(), "aborted", json!({"aborted": true, "factions": {}, "events": {}}));
        fs::write(match_path(dir.path(), "broken"), "{").unwrap();

        let ids: Vec<String> = ["ok", "aborted", "broken", "absent"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut cache = ParseCache::in_memory();
        let outcome = Ingestor::new(dir.path()).refresh(&ids, &mut cache).unwrap();

        let d = &outcome.diagnostics;
        assert!(!outcome.cancelled);
        assert_eq!(d.matches_seen, 4);
        assert_eq!(d.matches_parsed, 1);
        assert_eq!(d.matches_skipped["aborted"], 1);
        assert_eq!(d.matches_skipped["invalid_json"], 1);
        assert_eq!(d.matches_skipped["missing"], 1);
        assert!(cache.contains("ok"));
        assert!(!cache.contains("aborted"));
    }

    #[test]
    fn test_stop_flag_cancels_before_first_match() {
        let dir = tempfile::tempdir().unwrap();
        write_match(dir.path(), "ok", one_faction_match());

        let ingestor = Ingestor::new(dir.path());
        ingestor.stop_handle().store(true, Ordering::Relaxed);

        let mut cache = ParseCache::in_memory();
        let outcome = ingestor.refresh(&["ok".to_string()], &mut cache).unwrap();
        assert!(outcome.cancelled);
        assert!(cache.is_empty());
    }
}
