//! Input JSON schema for snellman match documents.
//!
//! Only the fields the extractor reads are modelled. Faction entries and
//! their event blocks stay as raw values so one bad participant can be
//! rejected without losing the rest of the match.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Top-level match document
#[derive(Debug, Clone, Deserialize)]
pub struct RawMatch {
    /// Truthy when the match never finished
    #[serde(default)]
    pub aborted: serde_json::Value,

    /// Declared number of seats
    #[serde(default, alias = "players")]
    pub player_count: Option<u8>,

    /// Faction name -> faction summary
    pub factions: serde_json::Map<String, serde_json::Value>,

    /// Event counts
    pub events: RawEvents,
}

/// Event counts, per faction and for the whole match
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvents {
    /// Faction name -> event log
    #[serde(default)]
    pub faction: serde_json::Map<String, serde_json::Value>,

    /// Match-level totals
    #[serde(default)]
    pub all: serde_json::Map<String, serde_json::Value>,
}

/// One faction's end-of-match summary
#[derive(Debug, Clone, Deserialize)]
pub struct RawFaction {
    /// Player name, `null` for anonymous seats
    ///
    /// The key itself is required; see [`has_field`].
    #[serde(default)]
    pub username: Option<String>,

    /// Final victory points
    #[serde(rename = "VP")]
    pub vp: f64,

    /// Victory points by source
    #[serde(default)]
    pub vp_source: BTreeMap<String, f64>,
}

/// Faction entry key whose presence, with any value, marks a dropped player
pub const DROPPED_KEY: &str = "dropped";

/// Whether a raw object carries `key`, even with a `null` value
pub fn has_field(value: &serde_json::Value, key: &str) -> bool {
    value.as_object().is_some_and(|o| o.contains_key(key))
}

/// Counts for one `category:subtype` event
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    /// Round index (as text) -> count, plus an `"all"` total
    #[serde(default)]
    pub round: BTreeMap<String, i64>,
}

/// Event name -> counts
pub type RawEventLog = BTreeMap<String, RawEvent>;

/// JSON truthiness as the match files use it (`true`, non-zero, non-empty)
pub fn is_truthy(value: &serde_json::Value) -> bool {
    match value {
        serde_json::Value::Null => false,
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        serde_json::Value::String(s) => !s.is_empty(),
        serde_json::Value::Array(a) => !a.is_empty(),
        serde_json::Value::Object(o) => !o.is_empty(),
    }
}
