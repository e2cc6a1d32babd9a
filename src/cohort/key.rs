//! Cohort key type and its string form.
//!
//! A key renders as `<faction><players><tier><tp><te><sa><sh><favors…>`:
//! one letter, three digits, four milestone digits, then one lowercase hex
//! digit per opening favor tile in ascending order. Example: `i4223454a`.

use crate::parser::faction::faction_name;
use crate::utils::config::{FAVOR_TILE_COUNT, MAX_PLAYERS, TIER_BAND};
use crate::utils::error::OutputError;
use std::fmt;
use std::str::FromStr;

/// Rating band of a participant with their faction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SkillTier {
    /// Player or faction absent from the rating source
    Unknown = 0,
    /// Below −37
    Novice = 1,
    /// [−37, 0)
    Intermediate = 2,
    /// [0, 37)
    Advanced = 3,
    /// 37 and above
    Expert = 4,
}

impl SkillTier {
    pub fn from_rating(rating: Option<f64>) -> Self {
        match rating {
            None => SkillTier::Unknown,
            Some(score) if score.is_nan() => SkillTier::Unknown,
            Some(score) if score < -TIER_BAND => SkillTier::Novice,
            Some(score) if score < 0.0 => SkillTier::Intermediate,
            Some(score) if score < TIER_BAND => SkillTier::Advanced,
            Some(_) => SkillTier::Expert,
        }
    }

    pub fn digit(self) -> u8 {
        self as u8
    }

    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            0 => Some(SkillTier::Unknown),
            1 => Some(SkillTier::Novice),
            2 => Some(SkillTier::Intermediate),
            3 => Some(SkillTier::Advanced),
            4 => Some(SkillTier::Expert),
            _ => None,
        }
    }
}

/// Milestone digit: 0 when never reached, otherwise round + 1
pub fn milestone_digit(round: Option<u8>) -> u8 {
    round.map(|r| r + 1).unwrap_or(0)
}

/// Favor tiles taken during the opening, as a bit set (bit 0 = FAV1)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FavorSet(u16);

impl FavorSet {
    pub fn empty() -> Self {
        Self(0)
    }

    /// Add a 1-based tile number; out-of-range tiles are ignored
    pub fn insert(&mut self, tile: u8) {
        if (1..=FAVOR_TILE_COUNT as u8).contains(&tile) {
            self.0 |= 1 << (tile - 1);
        }
    }

    pub fn contains(&self, tile: u8) -> bool {
        (1..=FAVOR_TILE_COUNT as u8).contains(&tile) && self.0 & (1 << (tile - 1)) != 0
    }

    /// Tiles in ascending order
    pub fn tiles(&self) -> impl Iterator<Item = u8> + '_ {
        (1..=FAVOR_TILE_COUNT as u8).filter(move |&t| self.contains(t))
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl FromIterator<u8> for FavorSet {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut set = FavorSet::empty();
        for tile in iter {
            set.insert(tile);
        }
        set
    }
}

/// Identifier of a cohort of comparable participants
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CohortKey {
    /// Faction token (`a`..`t`)
    pub faction: char,
    pub player_count: u8,
    pub tier: SkillTier,
    /// Milestone digits for TP, TE, SA, SH
    pub milestones: [u8; 4],
    pub favors: FavorSet,
}

impl fmt::Display for CohortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.faction, self.player_count, self.tier.digit())?;
        for digit in self.milestones {
            write!(f, "{}", digit)?;
        }
        for tile in self.favors.tiles() {
            write!(f, "{:x}", tile)?;
        }
        Ok(())
    }
}

impl FromStr for CohortKey {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| OutputError::InvalidKey(format!("'{}': {}", s, why));
        let chars: Vec<char> = s.chars().collect();
        if chars.len() < 7 {
            return Err(invalid("too short"));
        }

        let faction = chars[0];
        if faction_name(faction).is_none() {
            return Err(invalid("unknown faction token"));
        }

        let digit = |c: char| c.to_digit(10).map(|d| d as u8);

        let player_count = digit(chars[1])
            .filter(|n| (1..=MAX_PLAYERS).contains(n))
            .ok_or_else(|| invalid("bad player count"))?;

        let tier = digit(chars[2])
            .and_then(SkillTier::from_digit)
            .ok_or_else(|| invalid("bad skill tier"))?;

        let mut milestones = [0; 4];
        for (slot, &c) in milestones.iter_mut().zip(&chars[3..7]) {
            *slot = digit(c).ok_or_else(|| invalid("bad milestone digit"))?;
        }

        let mut favors = FavorSet::empty();
        let mut last = 0;
        for &c in &chars[7..] {
            let tile = c
                .to_digit(16)
                .filter(|_| !c.is_ascii_uppercase())
                .map(|t| t as u8)
                .filter(|t| (1..=FAVOR_TILE_COUNT as u8).contains(t))
                .ok_or_else(|| invalid("bad favor tile"))?;
            if tile <= last {
                return Err(invalid("favor tiles must be ascending"));
            }
            favors.insert(tile);
            last = tile;
        }

        Ok(CohortKey {
            faction,
            player_count,
            tier,
            milestones,
            favors,
        })
    }
}
