//! Output writers for cohort summaries.
//!
//! This module handles the on-disk forms of a finished pass:
//! - The compact cohort summary (scaled integer moments)
//! - The JSON run report
//! - Shared JSON read/write helpers
//! - Terminal summaries

pub mod json;
pub mod report;
pub mod summary;
pub mod terminal;

// Re-export main functions
pub use json::{read_report, read_summary, write_report, write_summary};
pub use report::RunReport;
pub use summary::{deserialize, serialize, DecodedSummary, SerializedMoments, Summary};
pub use terminal::{render_cohort, render_run_summary, render_z_score};
