// src/pipeline/validate.rs

use crate::error::Result;
use crate::models::{Assertion, Config};
use crate::services::{ADDRESS_LOOKUP, AddressBuilder};

/// Validate the configuration and return the parsed assertions.
pub fn run_validate(config: &Config) -> Result<Vec<Assertion>> {
    log::info!("Validating dataset {}...", config.dataset.name);

    if let Err(e) = config.validate() {
        log::error!("Config validation failed: {}", e);
        return Err(e);
    }
    AddressBuilder::for_dataset(&config.dataset)?;

    let assertions = config.dataset.assertions()?;
    log::info!("✓ Config OK");
    log::info!("  Output directory: {}", config.paths.output_dir.display());
    log::info!(
        "  Address corrections: {}",
        if config.dataset.lookups.contains_key(ADDRESS_LOOKUP) {
            "configured"
        } else {
            "none"
        }
    );
    log::info!("  Assertions: {}", assertions.len());
    for assertion in &assertions {
        log::info!("    {} ({})", assertion, assertion.action.as_str());
    }

    Ok(assertions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_lists_assertions() {
        let config = Config::from_toml(
            r#"
            [dataset]
            name = "test"

            [[dataset.assertions]]
            comparison = "GT"
            threshold = 1
            action = "WARN"
            filter = { attribute = "schema", value = "Address" }
            "#,
        )
        .unwrap();
        let assertions = run_validate(&config).unwrap();
        assert_eq!(assertions.len(), 1);
        assert_eq!(assertions[0].to_string(), "GT 1 filter: schema=Address");
    }

    #[test]
    fn test_validate_propagates_errors() {
        let mut config = Config::default();
        config.dataset.name.clear();
        assert!(run_validate(&config).is_err());
    }
}
