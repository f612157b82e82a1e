//! Address input fields and the normalized address record.

use serde::{Deserialize, Serialize};

use super::Entity;

/// Schema name used for address nodes.
pub const ADDRESS_SCHEMA: &str = "Address";

/// Prefix of deterministic address identifiers.
pub const ADDRESS_ID_PREFIX: &str = "addr-";

/// Raw postal data as a crawler finds it. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AddressFields {
    /// Complete single-line address, if the source has one
    pub full: Option<String>,
    pub remarks: Option<String>,
    /// Attention line / addressee
    pub summary: Option<String>,
    pub po_box: Option<String>,
    pub street: Option<String>,
    pub street2: Option<String>,
    pub street3: Option<String>,
    pub city: Option<String>,
    /// Sub-locality, joined in front of `city`
    pub place: Option<String>,
    pub postal_code: Option<String>,
    pub region: Option<String>,
    pub state: Option<String>,
    /// Country name (or code)
    pub country: Option<String>,
    /// ISO 3166-1 alpha-2 code
    pub country_code: Option<String>,
    /// Splits addresses that normalize identically but are distinct places
    pub key: Option<String>,
}

impl AddressFields {
    /// Shortcut for a free-text address.
    pub fn full(full: impl Into<String>) -> Self {
        Self {
            full: Some(full.into()),
            ..Self::default()
        }
    }

    pub fn with_country_code(mut self, code: impl Into<String>) -> Self {
        self.country_code = Some(code.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

/// A normalized postal address, immutable once built.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Address {
    /// `addr-<hash>`, present only when `full` is non-empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// ISO country codes, the resolved code first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub country: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_office_box: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
}

impl Address {
    /// The country code used for formatting and identity.
    pub fn country_code(&self) -> Option<&str> {
        self.country.first().map(String::as_str)
    }

    /// Whether the address can be deduplicated and emitted.
    pub fn is_identified(&self) -> bool {
        self.id.is_some()
    }

    /// Convert into an `Address` graph node.
    pub fn to_entity(&self) -> Entity {
        let mut entity = Entity::new(ADDRESS_SCHEMA);
        entity.id = self.id.clone();
        entity.add_opt("full", self.full.as_deref());
        entity.add_opt("street", self.street.as_deref());
        entity.add_opt("city", self.city.as_deref());
        entity.add_opt("postalCode", self.postal_code.as_deref());
        entity.add_opt("region", self.region.as_deref());
        entity.add_opt("state", self.state.as_deref());
        entity.add_all("country", &self.country);
        entity.add_opt("postOfficeBox", self.post_office_box.as_deref());
        entity.add_opt("summary", self.summary.as_deref());
        entity.add_opt("remarks", self.remarks.as_deref());
        entity
    }
}
