//! Cohort identification.
//!
//! Participants sharing faction, seat count, skill tier, milestone timing
//! and opening favor tiles form one cohort.

pub mod builder;
pub mod key;

pub use builder::CohortKeyBuilder;
pub use key::{milestone_digit, CohortKey, FavorSet, SkillTier};
