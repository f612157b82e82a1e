//! Dataset lookup tables for correcting known-bad source values.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::utils::normalize_whitespace;

/// A lookup as written in the dataset config.
///
/// ```toml
/// [dataset.lookups.address]
/// normalize = true
/// options = [
///   { match = ["c/o Registered Agent, Dover"], value = "8 The Green, Dover, DE 19901" },
///   { regex = "^n/?a$", value = "" },
/// ]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lookup {
    /// Compare lowercase, whitespace-collapsed text
    #[serde(default)]
    pub normalize: bool,

    #[serde(default)]
    pub options: Vec<LookupOption>,
}

/// One rule of a lookup. The first matching option wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupOption {
    /// Exact values to match
    #[serde(default, rename = "match")]
    pub matches: OneOrMany,

    /// Substrings to match
    #[serde(default)]
    pub contains: OneOrMany,

    /// Regular expressions to match
    #[serde(default)]
    pub regex: OneOrMany,

    /// Replacement value; absent means keep the input
    #[serde(default)]
    pub value: Option<String>,
}

/// A TOML value that may be a single string or a list of strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl OneOrMany {
    pub fn values(&self) -> &[String] {
        match self {
            OneOrMany::One(v) => std::slice::from_ref(v),
            OneOrMany::Many(vs) => vs,
        }
    }
}

/// A lookup with its patterns compiled, ready for matching.
#[derive(Debug, Clone, Default)]
pub struct LookupTable {
    normalize: bool,
    options: Vec<CompiledOption>,
}

#[derive(Debug, Clone)]
struct CompiledOption {
    matches: Vec<String>,
    contains: Vec<String>,
    regex: Vec<Regex>,
    value: Option<String>,
}

impl LookupTable {
    /// Compile a configured lookup. Fails if a regex is invalid.
    pub fn compile(lookup: &Lookup) -> Result<Self> {
        let normalize = lookup.normalize;
        let prep = |s: &String| Self::prepare(s, normalize);

        let options = lookup
            .options
            .iter()
            .map(|opt| -> Result<CompiledOption> {
                Ok(CompiledOption {
                    matches: opt.matches.values().iter().map(prep).collect(),
                    contains: opt.contains.values().iter().map(prep).collect(),
                    regex: opt
                        .regex
                        .values()
                        .iter()
                        .map(|r| Regex::new(r))
                        .collect::<std::result::Result<_, _>>()?,
                    value: opt.value.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { normalize, options })
    }

    /// Return the corrected value for `raw`, if an option matches and sets one.
    pub fn lookup(&self, raw: &str) -> Option<&str> {
        let prepared = Self::prepare(raw, self.normalize);
        let raw = raw.trim();

        self.options
            .iter()
            .find(|opt| {
                opt.matches.iter().any(|m| *m == prepared)
                    || opt.contains.iter().any(|c| prepared.contains(c.as_str()))
                    || opt.regex.iter().any(|r| r.is_match(raw))
            })
            .and_then(|opt| opt.value.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    fn prepare(s: &str, normalize: bool) -> String {
        if normalize {
            normalize_whitespace(s).to_lowercase()
        } else {
            s.trim().to_string()
        }
    }
}
