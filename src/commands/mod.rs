//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod aggregate;
pub mod lookup;
pub mod models;
pub mod utils;

// Re-export main command functions
pub use aggregate::{
    execute_aggregate, execute_aggregate_until, install_interrupt_handler, validate_args,
};
pub use lookup::{execute_lookup, lookup_cohort};
pub use models::{AggregateArgs, ConfigOverrides, LookupArgs};
pub use utils::{check_summary, display_schema, display_version, validate_summary_file};
