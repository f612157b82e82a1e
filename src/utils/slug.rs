// src/utils/slug.rs

//! Slug normalization used as the comparison key for entity identity.

use unicode_segmentation::UnicodeSegmentation;

/// Default separator between slug words.
pub const SLUG_SEP: &str = "-";

/// Reduce text to a lowercase, punctuation-free, separator-joined form.
///
/// Word boundaries follow Unicode segmentation, so non-Latin scripts keep
/// their letters. Returns `None` when nothing alphanumeric remains.
pub fn slugify(text: &str) -> Option<String> {
    slugify_with(text, SLUG_SEP)
}

/// Same as [`slugify`] with a custom separator.
pub fn slugify_with(text: &str, sep: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let words: Vec<String> = lowered
        .unicode_words()
        .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join(sep))
    }
}
