//! Slug derivation and validation.

use chrono::{DateTime, Utc};

/// Base used when a title has no ASCII letters or digits at all.
const FALLBACK_BASE: &str = "article";

/// Width of the `slug` column.
pub const MAX_SLUG_LEN: usize = 255;

/// Room kept free for a collision suffix (`-2` up to `-100`).
const COLLISION_SUFFIX_LEN: usize = 4;

/// Lowercase the title, turn spaces and underscores into hyphens and drop
/// everything outside `[a-z0-9-]`.
///
/// Runs of separators are kept as-is: `"a  b"` becomes `"a--b"`.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Slug for an article created without one: `<slugified title>-<unix seconds>`.
///
/// Long titles are cut so that the slug, plus a collision suffix, still fits
/// in [`MAX_SLUG_LEN`].
pub fn generate_slug(title: &str, now: DateTime<Utc>) -> String {
    let timestamp = now.timestamp().to_string();
    let max_base = MAX_SLUG_LEN - COLLISION_SUFFIX_LEN - timestamp.len() - 1;

    let mut base = slugify(title);
    // slugify only emits ASCII, so any byte index is a char boundary
    base.truncate(max_base);
    let base = base.trim_end_matches('-');

    let base = if base.trim_matches('-').is_empty() {
        FALLBACK_BASE
    } else {
        base
    };
    format!("{base}-{timestamp}")
}

/// Whether a caller supplied slug is usable in a URL path and as a directory
/// name.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= MAX_SLUG_LEN
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
