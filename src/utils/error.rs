//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors raised while turning a raw match document into participant records
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record in match {match_id} ({participant}): {reason}")]
    MalformedRecord {
        match_id: String,
        participant: String,
        reason: String,
    },

    #[error("Match {match_id} has an unassigned participant slot: {slot}")]
    IncompleteParticipants { match_id: String, slot: String },

    #[error("Match {0} was aborted")]
    Aborted(String),
}

impl ParseError {
    /// Short label used as the diagnostics bucket for this error
    pub fn kind(&self) -> &'static str {
        match self {
            ParseError::Json(_) => "invalid_json",
            ParseError::MalformedRecord { .. } => "malformed_record",
            ParseError::IncompleteParticipants { .. } => "incomplete_participants",
            ParseError::Aborted(_) => "aborted",
        }
    }
}

/// A per-round event count that is negative or does not fit the round arrays
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Event count out of range for {event}")]
pub struct CountOutOfRange {
    pub event: String,
}

/// Errors from the moment accumulator
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum StatsError {
    #[error("Degenerate distribution: second moment is zero")]
    DegenerateDistribution,

    #[error("Non-finite value rejected: {0}")]
    NonFinite(f64),
}

/// Errors from combining or configuring aggregation pools
#[derive(Error, Debug, PartialEq)]
pub enum PoolError {
    #[error("Metric lists differ: expected [{expected}], found [{found}]")]
    MetricMismatch { expected: String, found: String },

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Metric listed more than once: {0}")]
    DuplicateMetric(String),
}

/// Errors that can occur while loading configuration or ratings
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadFailed(#[from] std::io::Error),

    #[error("Config TOML parse error: {0}")]
    TomlParseFailed(#[from] toml::de::Error),

    #[error("Ratings JSON parse error: {0}")]
    RatingsParseFailed(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Fatal errors from the batch ingest driver
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read {path}: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {path}: {source}")]
    DecodeFailed {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write cache: {0}")]
    CacheWriteFailed(#[from] OutputError),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Invalid cohort key: {0}")]
    InvalidKey(String),
}
