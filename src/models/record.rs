//! Source records handed to the ingestion pipeline.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AddressFields;
use crate::error::{AppError, Result};

/// One subject as a crawler extracted it from its source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRecord {
    /// Identifier unique within the source
    pub id: String,

    /// Target schema, e.g. "Person" or "Company"
    #[serde(default = "default_schema")]
    pub schema: String,

    #[serde(default)]
    pub name: Option<String>,

    /// Country name or code of the subject itself
    #[serde(default)]
    pub country: Option<String>,

    /// Additional properties copied onto the subject as-is
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<String>>,

    /// Postal addresses of the subject
    #[serde(default)]
    pub addresses: Vec<AddressFields>,
}

impl SourceRecord {
    /// Load a JSON array of records.
    pub fn load_all(path: impl AsRef<Path>) -> Result<Vec<SourceRecord>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| AppError::input(path.display().to_string(), e))
    }
}

fn default_schema() -> String {
    "LegalEntity".to_string()
}
