//! Round-indexed event counts and building progress.
//!
//! Event logs key counts by round index as text (`"0"`..`"6"`) plus an
//! `"all"` total. Everything here works on fixed `[i32; ROUND_COUNT]`
//! arrays indexed by round number.

use super::schema::RawEventLog;
use crate::utils::config::{FAVOR_TILE_COUNT, ROUND_COUNT};
use crate::utils::error::CountOutOfRange;
use log::debug;
use serde::{Deserialize, Serialize};

/// Per-round counts, index = round number
pub type RoundCounts = [i32; ROUND_COUNT];

/// Structure tiers on the upgrade path
///
/// Dwelling → Trading post → Temple → Sanctuary, and
/// Trading post → Stronghold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BuildingTier {
    Dwelling,
    TradingPost,
    Temple,
    Sanctuary,
    Stronghold,
}

impl BuildingTier {
    pub const ALL: [BuildingTier; 5] = [
        BuildingTier::Dwelling,
        BuildingTier::TradingPost,
        BuildingTier::Temple,
        BuildingTier::Sanctuary,
        BuildingTier::Stronghold,
    ];

    /// Tiers whose first appearance is a cohort milestone, in key order
    pub const MILESTONES: [BuildingTier; 4] = [
        BuildingTier::TradingPost,
        BuildingTier::Temple,
        BuildingTier::Sanctuary,
        BuildingTier::Stronghold,
    ];

    /// Event that creates a structure of this tier
    pub fn event_name(self) -> &'static str {
        match self {
            BuildingTier::Dwelling => "build:D",
            BuildingTier::TradingPost => "upgrade:TP",
            BuildingTier::Temple => "upgrade:TE",
            BuildingTier::Sanctuary => "upgrade:SA",
            BuildingTier::Stronghold => "upgrade:SH",
        }
    }

    pub fn abbreviation(self) -> &'static str {
        match self {
            BuildingTier::Dwelling => "D",
            BuildingTier::TradingPost => "TP",
            BuildingTier::Temple => "TE",
            BuildingTier::Sanctuary => "SA",
            BuildingTier::Stronghold => "SH",
        }
    }

    pub fn from_abbreviation(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.abbreviation() == s)
    }
}

/// Per-round counts for one event, zero where the event never happened
///
/// Fails when a count is negative or its round total overflows `i32`.
pub fn round_counts(log: &RawEventLog, event: &str) -> Result<RoundCounts, CountOutOfRange> {
    let mut counts = [0; ROUND_COUNT];
    let Some(entry) = log.get(event) else {
        return Ok(counts);
    };
    let out_of_range = || CountOutOfRange {
        event: event.to_string(),
    };

    for (round, &count) in &entry.round {
        if round == "all" {
            continue;
        }
        match round.parse::<usize>() {
            Ok(r) if r < ROUND_COUNT => {
                let count = i32::try_from(count)
                    .ok()
                    .filter(|c| *c >= 0)
                    .ok_or_else(out_of_range)?;
                counts[r] = counts[r].checked_add(count).ok_or_else(out_of_range)?;
            }
            _ => debug!("Ignoring round '{}' for event {}", round, event),
        }
    }
    Ok(counts)
}

/// Earliest round in which an event has a positive count
pub fn first_round(log: &RawEventLog, event: &str) -> Result<Option<u8>, CountOutOfRange> {
    Ok(round_counts(log, event)?
        .iter()
        .position(|&c| c > 0)
        .map(|r| r as u8))
}

/// Round each favor tile FAV1..FAV12 was taken in
pub fn favor_rounds(
    log: &RawEventLog,
) -> Result<[Option<u8>; FAVOR_TILE_COUNT], CountOutOfRange> {
    let mut rounds = [None; FAVOR_TILE_COUNT];
    for (i, slot) in rounds.iter_mut().enumerate() {
        *slot = first_round(log, &format!("favor:FAV{}", i + 1))?;
    }
    Ok(rounds)
}

/// Structures standing at the end of each round, per tier
///
/// Invariant: a tier's count at round r is the cumulative number of
/// structures built into it minus the cumulative number upgraded out of it:
///
/// - `D  = Σ (build:D − upgrade:TP)`
/// - `TP = Σ (upgrade:TP − upgrade:TE − upgrade:SH)`
/// - `TE = Σ (upgrade:TE − upgrade:SA)`
/// - `SA = Σ upgrade:SA`
/// - `SH = Σ upgrade:SH`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingProgress {
    pub dwellings: RoundCounts,
    pub trading_posts: RoundCounts,
    pub temples: RoundCounts,
    pub sanctuaries: RoundCounts,
    pub strongholds: RoundCounts,
}

impl BuildingProgress {
    /// Derive standing structures from a faction's event log
    pub fn from_events(log: &RawEventLog) -> Result<Self, CountOutOfRange> {
        let d = round_counts(log, BuildingTier::Dwelling.event_name())?;
        let tp = round_counts(log, BuildingTier::TradingPost.event_name())?;
        let te = round_counts(log, BuildingTier::Temple.event_name())?;
        let sa = round_counts(log, BuildingTier::Sanctuary.event_name())?;
        let sh = round_counts(log, BuildingTier::Stronghold.event_name())?;

        let standing = |tier: BuildingTier, net: &dyn Fn(usize) -> Option<i32>| {
            cumulative(net).ok_or_else(|| CountOutOfRange {
                event: tier.event_name().to_string(),
            })
        };

        Ok(Self {
            dwellings: standing(BuildingTier::Dwelling, &|r: usize| d[r].checked_sub(tp[r]))?,
            trading_posts: standing(BuildingTier::TradingPost, &|r: usize| {
                tp[r].checked_sub(te[r])?.checked_sub(sh[r])
            })?,
            temples: standing(BuildingTier::Temple, &|r: usize| te[r].checked_sub(sa[r]))?,
            sanctuaries: standing(BuildingTier::Sanctuary, &|r: usize| Some(sa[r]))?,
            strongholds: standing(BuildingTier::Stronghold, &|r: usize| Some(sh[r]))?,
        })
    }

    pub fn tier(&self, tier: BuildingTier) -> &RoundCounts {
        match tier {
            BuildingTier::Dwelling => &self.dwellings,
            BuildingTier::TradingPost => &self.trading_posts,
            BuildingTier::Temple => &self.temples,
            BuildingTier::Sanctuary => &self.sanctuaries,
            BuildingTier::Stronghold => &self.strongholds,
        }
    }

    /// Structures of `tier` standing after `round`, if the round exists
    pub fn at_round(&self, tier: BuildingTier, round: usize) -> Option<i32> {
        self.tier(tier).get(round).copied()
    }
}

/// Running sum of `net` over the rounds; `None` on overflow
fn cumulative(net: &dyn Fn(usize) -> Option<i32>) -> Option<RoundCounts> {
    let mut out = [0; ROUND_COUNT];
    let mut running: i32 = 0;
    for (r, slot) in out.iter_mut().enumerate() {
        running = running.checked_add(net(r)?)?;
        *slot = running;
    }
    Some(out)
}
