//! Service layer for the crawler application.
//!
//! This module contains the business logic for:
//! - Address normalization and identity (`AddressBuilder`)
//! - Country name resolution (`CountryRegistry`)
//! - Per-country one-line formatting (`AddressFormatter`)

mod address;
mod countries;
mod formatter;

pub use address::{ADDRESS_LOOKUP, AddressBuilder, apply_address};
pub use countries::CountryRegistry;
pub use formatter::{AddressFormatter, FormatParts, Layout};
