//! Utility functions and helpers.

pub mod hash;
pub mod slug;

pub use hash::make_entity_id;
pub use slug::{slugify, slugify_with};

/// Join the non-blank parts with a separator, trimming each part.
pub fn join_text<'a, I>(parts: I, sep: &str) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let parts: Vec<&str> = parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(sep))
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
