//! Local filesystem storage implementation.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Entity;
use crate::pipeline::DatasetStats;
use crate::storage::{ENTITIES_FILE, EntityStorage, STATISTICS_FILE, WriteMetadata};

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Encode entities as JSON lines.
    fn encode_lines(entities: &[Entity]) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        for entity in entities {
            serde_json::to_writer(&mut buf, entity)?;
            buf.push(b'\n');
        }
        Ok(buf)
    }
}

#[async_trait]
impl EntityStorage for LocalStorage {
    async fn write_snapshot(
        &self,
        entities: &[Entity],
        stats: &DatasetStats,
    ) -> Result<WriteMetadata> {
        let now = Utc::now();

        self.write_bytes(ENTITIES_FILE, &Self::encode_lines(entities)?)
            .await?;
        self.write_json(STATISTICS_FILE, stats).await?;

        let location = self.path(ENTITIES_FILE).display().to_string();
        log::info!("Wrote {} entities to {}", entities.len(), location);

        Ok(WriteMetadata {
            entity_count: entities.len(),
            location,
            timestamp: now,
        })
    }

    async fn load_entities(&self) -> Result<Vec<Entity>> {
        let Some(bytes) = self.read_bytes(ENTITIES_FILE).await? else {
            log::warn!("No {} found", ENTITIES_FILE);
            return Ok(Vec::new());
        };

        let text = String::from_utf8(bytes)
            .map_err(|e| AppError::input(ENTITIES_FILE, e))?;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .enumerate()
            .map(|(idx, line)| {
                serde_json::from_str(line)
                    .map_err(|e| AppError::input(format!("{ENTITIES_FILE}:{}", idx + 1), e))
            })
            .collect()
    }

    async fn load_stats(&self) -> Result<Option<DatasetStats>> {
        self.read_json(STATISTICS_FILE).await
    }
}
