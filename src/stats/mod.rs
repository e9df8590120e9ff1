//! Driver statistics
//!
//! This module decodes Ergast envelopes and aggregates them into driver
//! profiles and season summaries.

pub mod aggregator;
pub mod summary;
pub mod wire;

pub use aggregator::{merge_standings, ProfileAssembly, SeasonAggregator};
pub use summary::summarize_season;
pub use wire::Envelope;
