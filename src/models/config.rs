//! Application configuration structures.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Assertion, Lookup, LookupTable};
use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Log verbosity
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Output locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// Dataset metadata, lookups and assertions
    #[serde(default)]
    pub dataset: DatasetConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.paths.output_dir.as_os_str().is_empty() {
            return Err(AppError::validation("paths.output_dir is empty"));
        }
        if self.logging.level.parse::<log::LevelFilter>().is_err() {
            return Err(AppError::validation(format!(
                "logging.level {:?} is not a log level",
                self.logging.level
            )));
        }
        self.dataset.validate()
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter level when RUST_LOG is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

/// Filesystem locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory receiving the entity snapshot and statistics
    #[serde(default = "defaults::output_dir")]
    pub output_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            output_dir: defaults::output_dir(),
        }
    }
}

/// Per-dataset metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Machine name of the dataset
    #[serde(default = "defaults::dataset_name")]
    pub name: String,

    /// Prefix for subject entity ids
    #[serde(default)]
    pub prefix: Option<String>,

    /// Human-readable title
    #[serde(default)]
    pub title: Option<String>,

    /// Value corrections keyed by type (e.g. "address")
    #[serde(default)]
    pub lookups: HashMap<String, Lookup>,

    /// Raw assertion rules; see [`DatasetConfig::assertions`]
    #[serde(default)]
    pub assertions: Vec<toml::Value>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            name: defaults::dataset_name(),
            prefix: None,
            title: None,
            lookups: HashMap::new(),
            assertions: Vec::new(),
        }
    }
}

impl DatasetConfig {
    /// Prefix for subject ids, falling back to the dataset name.
    pub fn id_prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or(&self.name)
    }

    /// Construct every configured assertion, failing on the first bad rule.
    pub fn assertions(&self) -> Result<Vec<Assertion>> {
        self.assertions
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                Assertion::from_config(raw).map_err(|e| {
                    AppError::config(format!("dataset.assertions[{idx}]: {e}"))
                })
            })
            .collect()
    }

    /// Compile the lookup for a value type. Missing lookups are empty.
    pub fn lookup_table(&self, name: &str) -> Result<LookupTable> {
        match self.lookups.get(name) {
            Some(lookup) => LookupTable::compile(lookup),
            None => Ok(LookupTable::default()),
        }
    }

    /// Check the name, every assertion and every lookup regex.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("dataset.name is empty"));
        }
        self.assertions()?;
        for (name, lookup) in &self.lookups {
            LookupTable::compile(lookup).map_err(|e| {
                AppError::config(format!("dataset.lookups.{name}: {e}"))
            })?;
        }
        Ok(())
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn log_level() -> String {
        "info".into()
    }

    pub fn output_dir() -> PathBuf {
        PathBuf::from("data/output")
    }

    pub fn dataset_name() -> String {
        "default".into()
    }
}
