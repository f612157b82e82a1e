//! Storage abstractions for dataset snapshots.
//!
//! ## Directory Structure
//!
//! ```text
//! {output_dir}/
//! ├── entities.ftm.json     # One entity per line
//! └── statistics.json       # DatasetStats of the last run
//! ```

pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::Entity;
use crate::pipeline::DatasetStats;

pub use local::LocalStorage;

/// File name of the entity snapshot.
pub const ENTITIES_FILE: &str = "entities.ftm.json";

/// File name of the statistics document.
pub const STATISTICS_FILE: &str = "statistics.json";

/// Metadata about a storage write operation.
#[derive(Debug, Clone)]
pub struct WriteMetadata {
    /// Number of entities written
    pub entity_count: usize,
    /// Where the snapshot landed
    pub location: String,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

/// Trait for snapshot storage backends.
#[async_trait]
pub trait EntityStorage: Send + Sync {
    /// Replace the snapshot with `entities` and their statistics.
    async fn write_snapshot(
        &self,
        entities: &[Entity],
        stats: &DatasetStats,
    ) -> Result<WriteMetadata>;

    /// Load the entity snapshot. Missing snapshots load as empty.
    async fn load_entities(&self) -> Result<Vec<Entity>>;

    /// Load the statistics of the last run, if any.
    async fn load_stats(&self) -> Result<Option<DatasetStats>>;
}
