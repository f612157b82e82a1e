// src/services/formatter.rs

//! Locale-aware one-line postal address formatting.
//!
//! Each country uses one of a few layouts that differ in component order
//! (postcode before or after the city, big-to-small for East Asia).
//! Components inside a group are space-joined; groups are comma-joined.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use crate::utils::normalize_whitespace;

/// Address components the formatter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Attention,
    House,
    Road,
    Postcode,
    City,
    State,
}

/// Input to [`AddressFormatter::one_line`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatParts<'a> {
    pub attention: Option<&'a str>,
    pub house: Option<&'a str>,
    pub road: Option<&'a str>,
    pub postcode: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
}

impl<'a> FormatParts<'a> {
    fn get(&self, component: Component) -> Option<&'a str> {
        match component {
            Component::Attention => self.attention,
            Component::House => self.house,
            Component::Road => self.road,
            Component::Postcode => self.postcode,
            Component::City => self.city,
            Component::State => self.state,
        }
    }
}

/// Address layout families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// `road, city, state postcode` (US, CA, AU, ...)
    Anglo,
    /// `road, city, state, postcode` (GB, IE, RU, ...)
    PostcodeLast,
    /// `road, postcode city, state` (continental Europe, LatAm)
    PostcodeCity,
    /// `postcode, state, city, road` (JP, CN, KR, TW)
    EastAsian,
}

impl Layout {
    fn groups(self) -> &'static [&'static [Component]] {
        use Component::*;
        match self {
            Layout::Anglo => &[
                &[Attention],
                &[House],
                &[Road],
                &[City],
                &[State, Postcode],
            ],
            Layout::PostcodeLast => &[
                &[Attention],
                &[House],
                &[Road],
                &[City],
                &[State],
                &[Postcode],
            ],
            Layout::PostcodeCity => &[
                &[Attention],
                &[House],
                &[Road],
                &[Postcode, City],
                &[State],
            ],
            Layout::EastAsian => &[
                &[Postcode],
                &[State],
                &[City],
                &[Road],
                &[House],
                &[Attention],
            ],
        }
    }
}

const LAYOUTS: &[(Layout, &[&str])] = &[
    (
        Layout::Anglo,
        &["us", "ca", "au", "ph", "my", "sg", "in", "pk", "ng", "za", "nz"],
    ),
    (
        Layout::PostcodeLast,
        &["gb", "ie", "im", "je", "gg", "gi", "ru", "ua", "by", "kz", "hk", "ae", "eg"],
    ),
    (
        Layout::PostcodeCity,
        &[
            "de", "at", "ch", "li", "fr", "be", "nl", "lu", "es", "pt", "it", "sm", "va", "mc",
            "dk", "se", "no", "fi", "is", "pl", "cz", "sk", "hu", "si", "hr", "rs", "ba", "me",
            "mk", "al", "gr", "cy", "bg", "ro", "md", "ee", "lv", "lt", "tr", "il", "ir", "mx",
            "br", "ar", "cl", "co", "pe", "ve", "uy", "py", "bo", "ec",
        ],
    ),
    (Layout::EastAsian, &["jp", "cn", "kr", "kp", "tw", "mo"]),
];

/// One-line address formatter keyed by country code.
///
/// Immutable after construction; share it with [`AddressFormatter::shared`].
#[derive(Debug)]
pub struct AddressFormatter {
    layouts: HashMap<&'static str, Layout>,
    default_layout: Layout,
}

impl AddressFormatter {
    pub fn new() -> Self {
        let layouts = LAYOUTS
            .iter()
            .flat_map(|(layout, codes)| codes.iter().map(move |code| (*code, *layout)))
            .collect();

        Self {
            layouts,
            default_layout: Layout::Anglo,
        }
    }

    /// Process-wide instance, built on first use.
    pub fn shared() -> Arc<AddressFormatter> {
        static FORMATTER: OnceLock<Arc<AddressFormatter>> = OnceLock::new();
        Arc::clone(FORMATTER.get_or_init(|| Arc::new(AddressFormatter::new())))
    }

    /// Layout for a country code. Unknown or malformed codes get the default.
    pub fn layout(&self, country: Option<&str>) -> Layout {
        country
            .map(|c| c.trim().to_lowercase())
            .and_then(|c| self.layouts.get(c.as_str()).copied())
            .unwrap_or(self.default_layout)
    }

    /// Format the parts on a single line. `None` if every part is blank.
    pub fn one_line(&self, parts: &FormatParts<'_>, country: Option<&str>) -> Option<String> {
        let groups: Vec<String> = self
            .layout(country)
            .groups()
            .iter()
            .filter_map(|group| {
                let words: Vec<String> = group
                    .iter()
                    .filter_map(|c| parts.get(*c).and_then(clean_part))
                    .collect();
                if words.is_empty() {
                    None
                } else {
                    Some(words.join(" "))
                }
            })
            .collect();

        if groups.is_empty() {
            None
        } else {
            Some(groups.join(", "))
        }
    }
}

impl Default for AddressFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Collapse whitespace and strip dangling separators from a component.
fn clean_part(value: &str) -> Option<String> {
    let value = normalize_whitespace(value);
    let value = value.trim_matches(|c: char| c == ',' || c == ';' || c.is_whitespace());
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
