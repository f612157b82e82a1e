//! Pipeline entry points and stages.
//!
//! - `run_ingest`: Build entities from source records and write the snapshot
//! - `run_validate`: Check configuration, lookups and assertions

pub mod assertions;
pub mod emit;
pub mod ingest;
pub mod stats;
pub mod validate;

pub use assertions::{AssertionGate, AssertionReport};
pub use emit::{Emitter, EntitySink};
pub use ingest::{IngestSummary, run_ingest};
pub use stats::{DatasetStats, StatsBuilder, build_stats};
pub use validate::run_validate;
