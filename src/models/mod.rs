// src/models/mod.rs

//! Domain models for the crawler core.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod address;
mod assertion;
mod config;
mod entity;
mod lookup;
mod record;

// Re-export all public types
pub use address::{ADDRESS_ID_PREFIX, ADDRESS_SCHEMA, Address, AddressFields};
pub use assertion::{Action, Assertion, AssertionOutcome, Comparison};
pub use config::{Config, DatasetConfig, LoggingConfig, PathsConfig};
pub use entity::Entity;
pub use lookup::{Lookup, LookupOption, LookupTable, OneOrMany};
pub use record::SourceRecord;
