//! Graph entity with multi-valued string properties.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node in the entity graph (Person, Company, Address, ...).
///
/// Property values keep insertion order and never repeat.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    /// Stable identifier; entities without one cannot be emitted
    pub id: Option<String>,

    /// Schema name, e.g. "Person" or "Address"
    pub schema: String,

    /// Property name -> values
    #[serde(default)]
    pub properties: BTreeMap<String, Vec<String>>,
}

impl Entity {
    /// Create an entity of the given schema without an id.
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            id: None,
            schema: schema.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a value to a property. Blank values and duplicates are ignored.
    pub fn add(&mut self, prop: &str, value: impl AsRef<str>) {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return;
        }
        let values = self.properties.entry(prop.to_string()).or_default();
        if !values.iter().any(|v| v == value) {
            values.push(value.to_string());
        }
    }

    /// Add an optional value.
    pub fn add_opt(&mut self, prop: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.add(prop, value);
        }
    }

    /// Add every value in order.
    pub fn add_all<I, S>(&mut self, prop: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for value in values {
            self.add(prop, value);
        }
    }

    /// Replace a property with a single value, or remove it for `None`.
    pub fn set(&mut self, prop: &str, value: Option<&str>) {
        self.properties.remove(prop);
        self.add_opt(prop, value);
    }

    /// All values of a property.
    pub fn get(&self, prop: &str) -> &[String] {
        self.properties
            .get(prop)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// First value of a property.
    pub fn first(&self, prop: &str) -> Option<&str> {
        self.get(prop).first().map(String::as_str)
    }

    /// Whether the property holds at least one value.
    pub fn has(&self, prop: &str) -> bool {
        !self.get(prop).is_empty()
    }

    /// Union the properties of another entity into this one.
    pub fn merge(&mut self, other: &Entity) {
        for (prop, values) in &other.properties {
            self.add_all(prop, values);
        }
    }
}
