//! JSON summary output writer.
//!
//! Writes summaries, run reports and the parse cache as pretty-printed JSON.

use super::report::RunReport;
use super::summary::Summary;
use crate::utils::error::OutputError;
use log::{debug, info};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a summary to a JSON file
///
/// **Public** - main entry point for summary output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_summary(summary: &Summary, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!(
        "Writing summary ({} cohorts) to: {}",
        summary.len(),
        output_path.display()
    );

    write_json(summary, output_path)?;

    info!(
        "Summary written successfully ({} bytes)",
        calculate_file_size(output_path)
    );
    Ok(())
}

/// Read a summary from a JSON file
///
/// # Errors
/// * `OutputError::WriteFailed` - File read error (reusing WriteFailed for I/O)
/// * `OutputError::SerializationFailed` - JSON parse error, including a value
///   that is neither a scalar nor a five-element array
pub fn read_summary(input_path: impl AsRef<Path>) -> Result<Summary, OutputError> {
    let input_path = input_path.as_ref();
    debug!("Reading summary from: {}", input_path.display());

    let summary: Summary = read_json(input_path)?;

    debug!("Summary loaded: {} cohorts", summary.len());
    Ok(summary)
}

/// Write a run report to a JSON file
pub fn write_report(report: &RunReport, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();
    info!("Writing run report to: {}", output_path.display());
    write_json(report, output_path)
}

pub fn read_report(input_path: impl AsRef<Path>) -> Result<RunReport, OutputError> {
    read_json(input_path.as_ref())
}

/// Serialize any value as pretty JSON, creating parent directories
///
/// **Public** - shared with the ingest cache
pub fn write_json<T: Serialize + ?Sized>(value: &T, output_path: &Path) -> Result<(), OutputError> {
    validate_output_path(output_path)?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!(
                    "Cannot create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }
    }

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, value).map_err(OutputError::SerializationFailed)?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(input_path: &Path) -> Result<T, OutputError> {
    let file = File::open(input_path).map_err(OutputError::WriteFailed)?;
    serde_json::from_reader(BufReader::new(file)).map_err(OutputError::SerializationFailed)
}

/// Validate that output path is writable
///
/// **Private** - internal validation
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    // Refuse to replace a directory
    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// **Private** - internal utility
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}
