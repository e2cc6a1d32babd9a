//! Match parsing and feature extraction.
//!
//! This module handles:
//! - Decoding raw match JSON (snellman format)
//! - Deriving round-indexed building progress and milestones
//! - Producing fixed-schema participant records
//! - Loading external player ratings

pub mod events;
pub mod extractor;
pub mod faction;
pub mod ratings;
pub mod record;
pub mod schema;

// Re-export main types
pub use events::{BuildingProgress, BuildingTier, RoundCounts};
pub use extractor::{FeatureExtractor, MatchExtraction, SnellmanExtractor};
pub use ratings::{RatingSource, RatingTable};
pub use record::ParticipantRecord;
