//! Incremental parse cache.
//!
//! Maps match id to the records extracted from it, so a rerun only parses
//! matches it has not seen before.

use crate::output::json::write_json;
use crate::parser::record::ParticipantRecord;
use crate::utils::error::IngestError;
use log::{debug, info};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ParseCache {
    path: Option<PathBuf>,
    entries: BTreeMap<String, Vec<ParticipantRecord>>,
}

impl ParseCache {
    /// Cache that is never persisted
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open the cache file, starting empty when it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, IngestError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|source| IngestError::DecodeFailed {
                    path: path.display().to_string(),
                    source,
                })?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No parse cache at {}, starting empty", path.display());
                BTreeMap::new()
            }
            Err(source) => {
                return Err(IngestError::ReadFailed {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let cache = Self {
            path: Some(path),
            entries,
        };
        info!("Parse cache holds {} matches", cache.len());
        Ok(cache)
    }

    /// Open the cache at `path`, or an in-memory one when unset
    pub fn open_optional(path: Option<&Path>) -> Result<Self, IngestError> {
        match path {
            Some(path) => Self::open(path),
            None => Ok(Self::in_memory()),
        }
    }

    pub fn contains(&self, match_id: &str) -> bool {
        self.entries.contains_key(match_id)
    }

    pub fn get(&self, match_id: &str) -> Option<&[ParticipantRecord]> {
        self.entries.get(match_id).map(Vec::as_slice)
    }

    /// Store a match's records; matches without records are not cached
    pub fn insert(&mut self, match_id: &str, records: Vec<ParticipantRecord>) -> bool {
        if records.is_empty() {
            return false;
        }
        self.entries.insert(match_id.to_string(), records);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Records of the listed matches, in list order, skipping uncached ids
    pub fn records_for<'a>(
        &'a self,
        match_ids: &'a [String],
    ) -> impl Iterator<Item = &'a ParticipantRecord> + 'a {
        match_ids
            .iter()
            .filter_map(|id| self.entries.get(id))
            .flatten()
    }

    /// Write the cache back to its file; a no-op for in-memory caches
    pub fn save(&self) -> Result<(), IngestError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        info!("Saving parse cache ({} matches) to {}", self.len(), path.display());
        write_json(&self.entries, path)?;
        Ok(())
    }
}
