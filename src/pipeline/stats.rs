//! Dataset statistics over emitted entities.
//!
//! Assertions are checked against these counts, and the serialized form is
//! written next to the entity snapshot as `statistics.json`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Entity;

/// Aggregated counts for one run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatasetStats {
    /// Dataset name
    pub dataset: String,
    /// When the run finished
    pub updated_at: Option<DateTime<Utc>>,
    /// Total number of entities
    pub entity_count: u64,
    /// Schema -> number of entities
    pub schemata: BTreeMap<String, u64>,
    /// Lowercased country code -> number of entities
    pub countries: BTreeMap<String, u64>,
    /// Property -> value -> number of entities carrying it
    #[serde(skip)]
    pub properties: BTreeMap<String, BTreeMap<String, u64>>,
}

impl DatasetStats {
    /// Count entities matching `attribute = value`.
    ///
    /// `schema` and `country` are resolved against the dedicated tables,
    /// every other attribute against property values.
    pub fn count(&self, attribute: &str, value: &str) -> u64 {
        match attribute {
            "schema" => self.schemata.get(value).copied().unwrap_or(0),
            "country" => self
                .countries
                .get(&value.to_lowercase())
                .copied()
                .unwrap_or(0),
            prop => self
                .properties
                .get(prop)
                .and_then(|values| values.get(value))
                .copied()
                .unwrap_or(0),
        }
    }
}

/// Accumulates [`DatasetStats`] one entity at a time.
pub struct StatsBuilder {
    dataset: String,
    stats: DatasetStats,
}

impl StatsBuilder {
    pub fn new(dataset: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            stats: DatasetStats::default(),
        }
    }

    /// Add an entity to the counts.
    pub fn add_entity(&mut self, entity: &Entity) {
        let stats = &mut self.stats;
        stats.entity_count += 1;
        *stats.schemata.entry(entity.schema.clone()).or_default() += 1;

        for country in entity.get("country") {
            *stats.countries.entry(country.to_lowercase()).or_default() += 1;
        }

        for (prop, values) in &entity.properties {
            let counts = stats.properties.entry(prop.clone()).or_default();
            for value in values {
                *counts.entry(value.clone()).or_default() += 1;
            }
        }
    }

    /// Add multiple entities.
    pub fn add_entities(&mut self, entities: &[Entity]) {
        for entity in entities {
            self.add_entity(entity);
        }
    }

    /// Finish and stamp the statistics.
    pub fn build(self) -> DatasetStats {
        DatasetStats {
            dataset: self.dataset,
            updated_at: Some(Utc::now()),
            ..self.stats
        }
    }
}

/// Convenience function to compute statistics over entities.
pub fn build_stats(dataset: &str, entities: &[Entity]) -> DatasetStats {
    let mut builder = StatsBuilder::new(dataset);
    builder.add_entities(entities);
    builder.build()
}
