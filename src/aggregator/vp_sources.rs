//! Victory point breakdown by source, overall and per faction.

use crate::output::summary::SerializedMoments;
use crate::parser::record::ParticipantRecord;
use crate::stats::MomentAccumulator;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Moments of the VP earned from each source
#[derive(Debug, Clone, Default)]
pub struct VpSourceStats {
    overall: BTreeMap<String, MomentAccumulator>,
    by_faction: BTreeMap<String, BTreeMap<String, MomentAccumulator>>,
    rejected: u64,
}

/// Serialized form of [`VpSourceStats`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VpSourceSummary {
    pub all: BTreeMap<String, SerializedMoments>,
    pub factions: BTreeMap<String, BTreeMap<String, SerializedMoments>>,
}

impl VpSourceStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn absorb(&mut self, record: &ParticipantRecord) {
        let faction = self.by_faction.entry(record.faction.clone()).or_default();
        for (source, &vp) in &record.vp_sources {
            let mut single = MomentAccumulator::default();
            if let Err(e) = single.incorporate(vp) {
                debug!(
                    "Match {}: {} VP from {} rejected: {}",
                    record.match_id, record.faction, source, e
                );
                self.rejected += 1;
                continue;
            }
            self.overall.entry(source.clone()).or_default().merge_from(&single);
            faction.entry(source.clone()).or_default().merge_from(&single);
        }
    }

    /// Source values that could not be incorporated
    pub fn rejected(&self) -> u64 {
        self.rejected
    }

    pub fn absorb_all<'a, I>(&mut self, records: I)
    where
        I: IntoIterator<Item = &'a ParticipantRecord>,
    {
        for record in records {
            self.absorb(record);
        }
    }

    pub fn source(&self, source: &str) -> Option<&MomentAccumulator> {
        self.overall.get(source)
    }

    pub fn faction_source(&self, faction: &str, source: &str) -> Option<&MomentAccumulator> {
        self.by_faction.get(faction)?.get(source)
    }

    /// Names of every source seen
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.overall.keys().map(String::as_str)
    }

    pub fn to_summary(&self) -> VpSourceSummary {
        let flatten = |accs: &BTreeMap<String, MomentAccumulator>| {
            accs.iter()
                .map(|(source, acc)| (source.clone(), SerializedMoments::from_accumulator(acc)))
                .collect()
        };

        VpSourceSummary {
            all: flatten(&self.overall),
            factions: self
                .by_faction
                .iter()
                .filter(|(_, sources)| !sources.is_empty())
                .map(|(faction, sources)| (faction.clone(), flatten(sources)))
                .collect(),
        }
    }
}
