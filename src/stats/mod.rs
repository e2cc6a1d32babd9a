//! Streaming statistics.
//!
//! Moments are computed in a single pass with constant memory and can be
//! merged across independently processed shards.

pub mod moments;

pub use moments::MomentAccumulator;
