//! Faction identity tokens.
//!
//! Every known faction maps to a single lowercase letter used as the first
//! character of a cohort key.

/// Known factions, in token order (`acolytes` = 'a' … `yetis` = 't')
pub const FACTIONS: &[&str] = &[
    "acolytes",
    "alchemists",
    "auren",
    "chaosmagicians",
    "cultists",
    "darklings",
    "dragonlords",
    "dwarves",
    "engineers",
    "fakirs",
    "giants",
    "halflings",
    "icemaidens",
    "mermaids",
    "nomads",
    "riverwalkers",
    "shapeshifters",
    "swarmlings",
    "witches",
    "yetis",
];

/// Token for a faction name
pub fn faction_token(name: &str) -> Option<char> {
    FACTIONS
        .iter()
        .position(|f| *f == name)
        .map(|i| (b'a' + i as u8) as char)
}

/// Faction name for a token
pub fn faction_name(token: char) -> Option<&'static str> {
    if !token.is_ascii_lowercase() {
        return None;
    }
    FACTIONS.get((token as u8 - b'a') as usize).copied()
}

/// Slot names like `player3` mark seats nobody has picked a faction for
pub fn is_placeholder_slot(name: &str) -> bool {
    name.strip_prefix("player")
        .map(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}
