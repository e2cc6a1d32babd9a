//! Game list and per-match document loading.

use crate::utils::error::IngestError;
use log::debug;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Outcome of reading one match document
#[derive(Debug)]
pub enum MatchDocument {
    Loaded(serde_json::Value),
    /// No file for this id
    Missing,
    /// File exists but could not be read
    Unreadable(std::io::Error),
    /// File is not valid JSON
    Invalid(serde_json::Error),
}

/// Read the list of match ids (a JSON array of strings)
pub fn read_game_list(path: impl AsRef<Path>) -> Result<Vec<String>, IngestError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| IngestError::ReadFailed {
        path: path.display().to_string(),
        source,
    })?;

    let ids: Vec<String> =
        serde_json::from_str(&contents).map_err(|source| IngestError::DecodeFailed {
            path: path.display().to_string(),
            source,
        })?;

    debug!("Game list {} holds {} match ids", path.display(), ids.len());
    Ok(ids)
}

/// Location of a match document: `<games_dir>/<id>.json`
pub fn match_path(games_dir: &Path, match_id: &str) -> PathBuf {
    games_dir.join(format!("{}.json", match_id))
}

/// Read and decode one match document without failing the batch
pub fn load_match(games_dir: &Path, match_id: &str) -> MatchDocument {
    let path = match_path(games_dir, match_id);
    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return MatchDocument::Missing,
        Err(e) => return MatchDocument::Unreadable(e),
    };

    match serde_json::from_str(&contents) {
        Ok(value) => MatchDocument::Loaded(value),
        Err(e) => MatchDocument::Invalid(e),
    }
}
