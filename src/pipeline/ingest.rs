// src/pipeline/ingest.rs

//! Record ingestion pipeline.

use chrono::Utc;

use crate::error::Result;
use crate::models::{Config, Entity, SourceRecord};
use crate::pipeline::{AssertionGate, AssertionReport, Emitter, EntitySink, build_stats};
use crate::services::{AddressBuilder, CountryRegistry, apply_address};
use crate::storage::{EntityStorage, WriteMetadata};
use crate::utils::slugify;

/// What an ingestion run produced.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    /// Subjects emitted
    pub subjects: usize,
    /// Records skipped for lacking a usable id
    pub skipped: usize,
    /// Total entities in the snapshot (subjects and addresses)
    pub entity_count: usize,
    pub assertions: AssertionReport,
    pub write: WriteMetadata,
}

/// Turn source records into entities, gate them and write the snapshot.
///
/// The snapshot is written only if no FAIL assertion is violated.
pub async fn run_ingest(
    config: &Config,
    storage: &dyn EntityStorage,
    records: &[SourceRecord],
) -> Result<IngestSummary> {
    let start_time = Utc::now();
    let dataset = &config.dataset;
    log::info!("Ingesting {} records into {}", records.len(), dataset.name);

    // Bad rules abort before any work is done.
    let gate = AssertionGate::new(dataset.assertions()?);
    let builder = AddressBuilder::for_dataset(dataset)?;
    let emitter = Emitter::new();

    let mut subjects = 0;
    let mut skipped = 0;
    for record in records {
        match make_subject(dataset.id_prefix(), record, &builder, &emitter) {
            Some(subject) => {
                if emitter.emit(subject) {
                    subjects += 1;
                }
            }
            None => skipped += 1,
        }
    }

    let entities = emitter.entities();
    let stats = build_stats(&dataset.name, &entities);
    log::info!(
        "Emitted {} entities ({} subjects, {} skipped records)",
        entities.len(),
        subjects,
        skipped
    );

    let assertions = gate.validate(&stats)?;
    let write = storage.write_snapshot(&entities, &stats).await?;

    let elapsed = Utc::now() - start_time;
    log::info!(
        "Ingestion complete in {}.{:03}s",
        elapsed.num_seconds(),
        elapsed.num_milliseconds() % 1000
    );

    Ok(IngestSummary {
        subjects,
        skipped,
        entity_count: entities.len(),
        assertions,
        write,
    })
}

/// Build the subject entity for one record, linking its addresses.
fn make_subject(
    prefix: &str,
    record: &SourceRecord,
    builder: &AddressBuilder,
    sink: &dyn EntitySink,
) -> Option<Entity> {
    let Some(slug) = slugify(&record.id) else {
        log::warn!("Skipping record with unusable id {:?}", record.id);
        return None;
    };

    let mut subject = Entity::new(&record.schema).with_id(format!("{prefix}-{slug}"));
    subject.add_opt("name", record.name.as_deref());

    if let Some(country) = record.country.as_deref() {
        match CountryRegistry::shared().parse(country) {
            Some(code) => subject.add("country", code),
            None => log::warn!("Unknown country {:?} on record {}", country, record.id),
        }
    }

    for (prop, values) in &record.properties {
        subject.add_all(prop, values);
    }

    for fields in &record.addresses {
        let address = builder.build(fields.clone());
        if !address.is_identified() {
            log::debug!("Address on record {} has no identity", record.id);
        }
        apply_address(&mut subject, Some(&address), sink);
    }

    Some(subject)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::AddressFields;
    use crate::storage::LocalStorage;
    use tempfile::TempDir;

    fn record(id: &str, addresses: Vec<AddressFields>) -> SourceRecord {
        SourceRecord {
            id: id.to_string(),
            schema: "Company".to_string(),
            name: Some(format!("Company {id}")),
            country: Some("United Kingdom".to_string()),
            properties: Default::default(),
            addresses,
        }
    }

    fn downing_street() -> AddressFields {
        AddressFields {
            street: Some("10 Downing St".into()),
            city: Some("London".into()),
            postal_code: Some("SW1A 2AA".into()),
            country_code: Some("gb".into()),
            ..AddressFields::default()
        }
    }

    fn config(output: &std::path::Path, assertions: &str) -> Config {
        let mut config = Config::from_toml(&format!(
            "[dataset]\nname = \"test\"\nprefix = \"tst\"\n{assertions}"
        ))
        .unwrap();
        config.paths.output_dir = output.to_path_buf();
        config
    }

    #[tokio::test]
    async fn test_ingest_dedupes_shared_address() {
        let tmp = TempDir::new().unwrap();
        let config = config(tmp.path(), "");
        let storage = LocalStorage::new(tmp.path());
        let records = vec![
            record("A-1", vec![downing_street()]),
            record("B 2", vec![downing_street()]),
        ];

        let summary = run_ingest(&config, &storage, &records).await.unwrap();
        assert_eq!(summary.subjects, 2);
        assert_eq!(summary.entity_count, 3);

        let entities = storage.load_entities().await.unwrap();
        let subject = entities
            .iter()
            .find(|e| e.id.as_deref() == Some("tst-a-1"))
            .unwrap();
        assert_eq!(subject.get("country"), ["gb"]);
        let address_id = subject.first("addressEntity").unwrap();
        assert!(address_id.starts_with("addr-"));

        let other = entities
            .iter()
            .find(|e| e.id.as_deref() == Some("tst-b-2"))
            .unwrap();
        assert_eq!(other.first("addressEntity"), Some(address_id));
    }

    #[tokio::test]
    async fn test_ingest_skips_unusable_ids() {
        let tmp = TempDir::new().unwrap();
        let config = config(tmp.path(), "");
        let storage = LocalStorage::new(tmp.path());

        let summary = run_ingest(&config, &storage, &[record("--", vec![])])
            .await
            .unwrap();
        assert_eq!(summary.subjects, 0);
        assert_eq!(summary.skipped, 1);
    }

    #[tokio::test]
    async fn test_failed_assertion_blocks_snapshot() {
        let tmp = TempDir::new().unwrap();
        let config = config(
            tmp.path(),
            r#"
            [[dataset.assertions]]
            comparison = "LT"
            threshold = 5
            action = "FAIL"
            filter = { attribute = "schema", value = "Company" }
            "#,
        );
        let storage = LocalStorage::new(tmp.path());

        let err = run_ingest(&config, &storage, &[record("1", vec![])])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AssertionFailed { observed: 1, .. }));
        assert!(storage.load_stats().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_warning_assertion_still_writes() {
        let tmp = TempDir::new().unwrap();
        let config = config(
            tmp.path(),
            r#"
            [[dataset.assertions]]
            comparison = "LT"
            threshold = 5
            action = "WARN"
            filter = { attribute = "country", value = "gb" }
            "#,
        );
        let storage = LocalStorage::new(tmp.path());

        let summary = run_ingest(&config, &storage, &[record("1", vec![downing_street()])])
            .await
            .unwrap();
        assert_eq!(summary.assertions.warned, 1);
        assert_eq!(storage.load_entities().await.unwrap().len(), 2);
    }
}
