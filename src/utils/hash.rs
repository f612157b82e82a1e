// src/utils/hash.rs

//! Deterministic content identifiers.

use sha2::{Digest, Sha256};

/// Hash the non-empty parts into a stable hex identifier.
///
/// Empty and blank parts are skipped. Kept parts are joined with a NUL byte,
/// so ("ab", "c") and ("a", "bc") hash differently. Returns `None` if
/// nothing was hashed.
pub fn make_entity_id<'a, I>(parts: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut hasher = Sha256::new();
    let mut hashed = false;

    for part in parts.into_iter().flatten() {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if hashed {
            hasher.update(b"\0");
        }
        hasher.update(part.as_bytes());
        hashed = true;
    }

    if !hashed {
        return None;
    }
    Some(hex::encode(hasher.finalize()))
}
