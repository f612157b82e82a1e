// src/services/address.rs

//! Address normalization and deterministic identity.
//!
//! Building runs four explicit stages:
//!
//! 1. **merge**: join place/city and street lines, clean countries
//! 2. **compose**: format a one-line `full` if the source gave none
//! 3. **correct**: detect country names in `full`, apply dataset overrides
//! 4. **identify**: hash `(country, slug(full), key)` into `addr-<hex>`

use std::sync::Arc;

use crate::error::Result;
use crate::models::{
    ADDRESS_ID_PREFIX, Address, AddressFields, DatasetConfig, Entity, LookupTable,
};
use crate::pipeline::EntitySink;
use crate::services::countries::CountryRegistry;
use crate::services::formatter::{AddressFormatter, FormatParts};
use crate::utils::{join_text, make_entity_id, normalize_whitespace, slugify};

/// Lookup type holding address corrections.
pub const ADDRESS_LOOKUP: &str = "address";

/// Builds normalized [`Address`] records. Holds no per-call state.
#[derive(Debug, Clone)]
pub struct AddressBuilder {
    formatter: Arc<AddressFormatter>,
    countries: &'static CountryRegistry,
    corrections: Arc<LookupTable>,
}

/// Output of the merge stage.
#[derive(Debug, Clone, Default)]
struct Merged {
    full: Option<String>,
    remarks: Option<String>,
    summary: Option<String>,
    po_box: Option<String>,
    street: Option<String>,
    city: Option<String>,
    postal_code: Option<String>,
    region: Option<String>,
    state: Option<String>,
    countries: Vec<String>,
    key: Option<String>,
}

impl Merged {
    fn country_code(&self) -> Option<&str> {
        self.countries.first().map(String::as_str)
    }

    fn add_country(&mut self, code: &str) {
        if !self.countries.iter().any(|c| c == code) {
            self.countries.push(code.to_string());
        }
    }
}

/// Output of the compose and correct stages: the record with its final `full`.
#[derive(Debug, Clone)]
struct Composed {
    merged: Merged,
    /// Country code resolved from the inputs, before leakage detection
    country_code: Option<String>,
}

impl AddressBuilder {
    /// Create a builder with explicit collaborators.
    pub fn new(formatter: Arc<AddressFormatter>, corrections: Arc<LookupTable>) -> Self {
        Self {
            formatter,
            countries: CountryRegistry::shared(),
            corrections,
        }
    }

    /// Builder using the shared formatter and the dataset's address lookup.
    pub fn for_dataset(dataset: &DatasetConfig) -> Result<Self> {
        let corrections = dataset.lookup_table(ADDRESS_LOOKUP)?;
        Ok(Self::new(AddressFormatter::shared(), Arc::new(corrections)))
    }

    /// Build a normalized address. Never fails; empty input gives an empty,
    /// unidentified address.
    pub fn build(&self, fields: AddressFields) -> Address {
        let merged = self.merge(fields);
        let composed = self.compose(merged);
        let composed = self.correct(composed);
        self.identify(composed)
    }

    fn merge(&self, fields: AddressFields) -> Merged {
        let AddressFields {
            full,
            remarks,
            summary,
            po_box,
            street,
            street2,
            street3,
            city,
            place,
            postal_code,
            region,
            state,
            country,
            country_code,
            key,
        } = fields;

        let mut merged = Merged {
            full: clean_text(full),
            remarks: clean_text(remarks),
            summary: clean_text(summary),
            po_box: clean_text(po_box),
            street: join_text(
                [street.as_deref(), street2.as_deref(), street3.as_deref()],
                ", ",
            )
            .map(|s| normalize_whitespace(&s)),
            city: join_text([place.as_deref(), city.as_deref()], ", ")
                .map(|s| normalize_whitespace(&s)),
            postal_code: clean_text(postal_code),
            region: clean_text(region),
            state: clean_text(state),
            countries: Vec::new(),
            key: clean_text(key),
        };

        for value in [country, country_code].into_iter().flatten() {
            if value.trim().is_empty() {
                continue;
            }
            match self.countries.parse(&value) {
                Some(code) => merged.add_country(code),
                None => log::warn!("Rejected country value: {:?}", value),
            }
        }

        merged
    }

    fn compose(&self, mut merged: Merged) -> Composed {
        let country_code = merged.country_code().map(str::to_string);

        if merged.full.is_none() {
            let state = join_text([merged.region.as_deref(), merged.state.as_deref()], ", ");
            let parts = FormatParts {
                attention: merged.summary.as_deref(),
                house: merged.po_box.as_deref(),
                road: merged.street.as_deref(),
                postcode: merged.postal_code.as_deref(),
                city: merged.city.as_deref(),
                state: state.as_deref(),
            };
            merged.full = self.formatter.one_line(&parts, country_code.as_deref());
        }

        Composed {
            merged,
            country_code,
        }
    }

    fn correct(&self, mut composed: Composed) -> Composed {
        let merged = &mut composed.merged;

        // A country name sitting in the address line still tells us the country.
        if let Some(code) = merged.full.as_deref().and_then(|f| self.countries.parse(f)) {
            log::debug!("Country name in address line: {:?} -> {}", merged.full, code);
            merged.add_country(code);
        }

        if let Some(full) = merged.full.take() {
            let corrected = match self.corrections.lookup(&full) {
                Some(fixed) => {
                    log::debug!("Address override: {:?} -> {:?}", full, fixed);
                    fixed.to_string()
                }
                None => full,
            };
            merged.full = clean_text(Some(corrected));
        }

        composed
    }

    fn identify(&self, composed: Composed) -> Address {
        let Composed {
            merged,
            country_code,
        } = composed;

        let id = merged.full.as_deref().and_then(|full| {
            let norm_full = slugify(full);
            make_entity_id([
                country_code.as_deref(),
                norm_full.as_deref(),
                merged.key.as_deref(),
            ])
            .map(|hash| format!("{ADDRESS_ID_PREFIX}{hash}"))
        });

        Address {
            id,
            full: merged.full,
            street: merged.street,
            city: merged.city,
            postal_code: merged.postal_code,
            region: merged.region,
            state: merged.state,
            country: merged.countries,
            post_office_box: merged.po_box,
            summary: merged.summary,
            remarks: merged.remarks,
        }
    }
}

/// Attach an address to a subject and emit the address node.
///
/// The subject always inherits the address countries. Only identified
/// addresses are linked via `addressEntity` and emitted; the sink dedupes
/// repeated ids.
pub fn apply_address(subject: &mut Entity, address: Option<&Address>, sink: &dyn EntitySink) {
    let Some(address) = address else {
        return;
    };

    subject.add_all("country", &address.country);

    if let Some(id) = &address.id {
        subject.add("addressEntity", id);
        sink.emit(address.to_entity());
    }
}

fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| normalize_whitespace(&v))
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Lookup;
    use crate::pipeline::Emitter;

    fn builder() -> AddressBuilder {
        AddressBuilder::new(AddressFormatter::shared(), Arc::new(LookupTable::default()))
    }

    fn builder_with_lookup(src: &str) -> AddressBuilder {
        let lookup: Lookup = toml::from_str(src).unwrap();
        let table = LookupTable::compile(&lookup).unwrap();
        AddressBuilder::new(AddressFormatter::shared(), Arc::new(table))
    }

    #[test]
    fn test_deterministic_id() {
        let b = builder();
        let fields = AddressFields::full("1 Main St").with_country_code("us");
        let a1 = b.build(fields.clone());
        let a2 = builder().build(fields);
        assert!(a1.id.is_some());
        assert_eq!(a1.id, a2.id);
        assert!(a1.id.unwrap().starts_with(ADDRESS_ID_PREFIX));
    }

    #[test]
    fn test_key_disambiguates() {
        let b = builder();
        let a = b.build(AddressFields::full("1 Main St").with_key("A"));
        let c = b.build(AddressFields::full("1 Main St").with_key("B"));
        assert!(a.id.is_some() && c.id.is_some());
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_known_id() {
        let address = builder()
            .build(AddressFields::full("10 Downing St, London, SW1A 2AA").with_country_code("gb"));
        assert_eq!(
            address.id.as_deref(),
            Some("addr-f66f08f93e162e9ab607a5d1d1a2054e2aa90685da0e1f8a7616a04179e941a6")
        );
    }

    #[test]
    fn test_parts_do_not_run_together() {
        let b = builder();
        let keyed = b.build(AddressFields::full("1 Main St").with_key("a"));
        let longer = b.build(AddressFields::full("1 Main Sta"));
        assert!(keyed.id.is_some());
        assert_ne!(keyed.id, longer.id);

        let coded = b.build(AddressFields::full("1 Main").with_country_code("us"));
        let prefixed = b.build(AddressFields::full("US1 Main"));
        assert!(coded.id.is_some());
        assert_ne!(coded.id, prefixed.id);
    }

    #[test]
    fn test_territory_codes_accepted() {
        let b = builder();
        for code in ["pr", "cw", "tc", "ai", "aw", "fo", "gl", "re", "vi", "nc"] {
            let address = b.build(AddressFields::full("1 Main St").with_country_code(code));
            assert_eq!(address.country, vec![code.to_string()], "{code}");
        }
    }

    #[test]
    fn test_qualified_country_name_accepted() {
        let address = builder().build(AddressFields {
            full: Some("Valiasr St, Tehran".into()),
            country: Some("Iran (Islamic Republic of)".into()),
            ..AddressFields::default()
        });
        assert_eq!(address.country, vec!["ir".to_string()]);
    }

    #[test]
    fn test_punctuation_variants_share_id() {
        let b = builder();
        let a = b.build(AddressFields::full("1 Main St.,  Springfield"));
        let c = b.build(AddressFields::full("1 main st springfield"));
        assert_eq!(a.id, c.id);
        assert_ne!(a.full, c.full);
    }

    #[test]
    fn test_country_changes_id() {
        let b = builder();
        let a = b.build(AddressFields::full("1 Main St").with_country_code("us"));
        let c = b.build(AddressFields::full("1 Main St").with_country_code("ca"));
        assert_ne!(a.id, c.id);
    }

    #[test]
    fn test_empty_input() {
        let address = builder().build(AddressFields::default());
        assert_eq!(address, Address::default());
        assert!(address.id.is_none());
        assert!(address.full.is_none());
    }

    #[test]
    fn test_blank_strings_are_empty() {
        let fields = AddressFields {
            full: Some("   ".into()),
            city: Some(" ".into()),
            ..AddressFields::default()
        };
        let address = builder().build(fields);
        assert!(address.id.is_none());
        assert!(address.full.is_none());
        assert!(address.city.is_none());
    }

    #[test]
    fn test_country_leakage() {
        let address = builder().build(AddressFields::full("Iran"));
        assert_eq!(address.full.as_deref(), Some("Iran"));
        assert!(address.country.contains(&"ir".to_string()));
        assert!(address.id.is_some());
    }

    #[test]
    fn test_leaked_country_does_not_change_identity_code() {
        let b = builder();
        let leaked = b.build(AddressFields::full("Iran"));
        let plain = b.build(AddressFields::full("iran"));
        // Neither input carried a country, so both hash without one.
        assert_eq!(leaked.id, plain.id);
    }

    #[test]
    fn test_formatter_fallback() {
        let fields = AddressFields {
            street: Some("10 Downing St".into()),
            city: Some("London".into()),
            postal_code: Some("SW1A 2AA".into()),
            country_code: Some("gb".into()),
            ..AddressFields::default()
        };
        let address = builder().build(fields);
        let full = address.full.unwrap();
        assert!(full.contains("10 Downing St"));
        assert!(full.contains("London"));
        assert!(full.contains("SW1A 2AA"));
        assert_eq!(full, "10 Downing St, London, SW1A 2AA");
        assert_eq!(address.country, vec!["gb".to_string()]);
        assert!(address.id.is_some());
    }

    #[test]
    fn test_merges_place_city_and_streets() {
        let fields = AddressFields {
            street: Some("Unit 4".into()),
            street2: Some("  ".into()),
            street3: Some("Harbour Rd".into()),
            place: Some("Wan Chai".into()),
            city: Some("Hong Kong".into()),
            region: Some("HK Island".into()),
            ..AddressFields::default()
        };
        let address = builder().build(fields);
        assert_eq!(address.street.as_deref(), Some("Unit 4, Harbour Rd"));
        assert_eq!(address.city.as_deref(), Some("Wan Chai, Hong Kong"));
        assert_eq!(
            address.full.as_deref(),
            Some("Unit 4, Harbour Rd, Wan Chai, Hong Kong, HK Island")
        );
    }

    #[test]
    fn test_supplied_full_is_not_recomposed() {
        let fields = AddressFields {
            full: Some("PO Box 7, Nassau".into()),
            street: Some("Bay Street".into()),
            country: Some("Bahamas".into()),
            ..AddressFields::default()
        };
        let address = builder().build(fields);
        assert_eq!(address.full.as_deref(), Some("PO Box 7, Nassau"));
        assert_eq!(address.street.as_deref(), Some("Bay Street"));
        assert_eq!(address.country, vec!["bs".to_string()]);
    }

    #[test]
    fn test_country_name_and_code_both_recorded() {
        let fields = AddressFields {
            full: Some("Somewhere 1".into()),
            country: Some("Germany".into()),
            country_code: Some("AT".into()),
            ..AddressFields::default()
        };
        let address = builder().build(fields);
        assert_eq!(address.country, vec!["de".to_string(), "at".to_string()]);
        assert_eq!(address.country_code(), Some("de"));
    }

    #[test]
    fn test_unknown_country_rejected() {
        let fields = AddressFields {
            full: Some("1 Main St".into()),
            country: Some("Atlantis".into()),
            ..AddressFields::default()
        };
        let address = builder().build(fields);
        assert!(address.country.is_empty());
        assert!(address.id.is_some());
    }

    #[test]
    fn test_summary_and_po_box_compose() {
        let fields = AddressFields {
            summary: Some("Attn: Legal Dept".into()),
            po_box: Some("PO Box 123".into()),
            city: Some("Road Town".into()),
            country: Some("British Virgin Islands".into()),
            ..AddressFields::default()
        };
        let address = builder().build(fields);
        assert_eq!(
            address.full.as_deref(),
            Some("Attn: Legal Dept, PO Box 123, Road Town")
        );
        assert_eq!(address.post_office_box.as_deref(), Some("PO Box 123"));
        assert_eq!(address.summary.as_deref(), Some("Attn: Legal Dept"));
    }

    #[test]
    fn test_lookup_correction() {
        let b = builder_with_lookup(
            r#"
            options = [{ match = "c/o Agent, Dover", value = "8 The Green, Dover, DE 19901" }]
            "#,
        );
        let corrected = b.build(AddressFields::full("c/o Agent, Dover"));
        let direct = b.build(AddressFields::full("8 The Green, Dover, DE 19901"));
        assert_eq!(
            corrected.full.as_deref(),
            Some("8 The Green, Dover, DE 19901")
        );
        assert_eq!(corrected.id, direct.id);
    }

    #[test]
    fn test_lookup_correction_to_blank_drops_id() {
        let b = builder_with_lookup(r#"options = [{ match = "n/a", value = "" }]"#);
        let address = b.build(AddressFields::full("n/a"));
        assert!(address.full.is_none());
        assert!(address.id.is_none());
    }

    #[test]
    fn test_punctuation_only_full_still_identified() {
        // The slug is empty, so the id falls back to the remaining parts.
        let b = builder();
        let a = b.build(AddressFields::full("-").with_country_code("us"));
        let c = b.build(AddressFields::full("--").with_country_code("us"));
        assert!(a.id.is_some());
        assert_eq!(a.id, c.id);
        assert!(b.build(AddressFields::full("-")).id.is_none());
    }

    #[test]
    fn test_apply_address_links_and_emits_once() {
        let emitter = Emitter::new();
        let address = builder().build(AddressFields::full("1 Main St").with_country_code("us"));

        let mut alice = Entity::new("Person").with_id("p-alice");
        let mut bob = Entity::new("Person").with_id("p-bob");
        apply_address(&mut alice, Some(&address), &emitter);
        apply_address(&mut bob, Some(&address), &emitter);

        let id = address.id.clone().unwrap();
        assert_eq!(alice.first("addressEntity"), Some(id.as_str()));
        assert_eq!(bob.first("addressEntity"), Some(id.as_str()));
        assert_eq!(alice.get("country"), &["us".to_string()]);

        let emitted = emitter.entities();
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].id.as_deref(), Some(id.as_str()));
    }

    #[test]
    fn test_concurrent_apply_emits_once() {
        let emitter = Emitter::new();
        let b = builder();

        std::thread::scope(|scope| {
            for n in 0..8 {
                let (b, emitter) = (&b, &emitter);
                scope.spawn(move || {
                    let address = b.build(
                        AddressFields::full("10 Downing St, London, SW1A 2AA")
                            .with_country_code("gb"),
                    );
                    let mut subject = Entity::new("Company").with_id(format!("co-{n}"));
                    apply_address(&mut subject, Some(&address), emitter);
                    assert!(subject.has("addressEntity"));
                });
            }
        });

        assert_eq!(emitter.len(), 1);
    }

    #[test]
    fn test_apply_address_without_id_copies_country_only() {
        let emitter = Emitter::new();
        let address = builder().build(AddressFields {
            country: Some("France".into()),
            ..AddressFields::default()
        });
        assert!(address.id.is_none());

        let mut subject = Entity::new("Company").with_id("co-1");
        apply_address(&mut subject, Some(&address), &emitter);
        assert_eq!(subject.get("country"), &["fr".to_string()]);
        assert!(!subject.has("addressEntity"));
        assert!(emitter.entities().is_empty());
    }

    #[test]
    fn test_apply_address_none_is_noop() {
        let emitter = Emitter::new();
        let mut subject = Entity::new("Company").with_id("co-1");
        apply_address(&mut subject, None, &emitter);
        assert!(subject.properties.is_empty());
        assert!(emitter.entities().is_empty());
    }
}
