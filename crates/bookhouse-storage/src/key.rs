//! Object Key Generation
//!
//! Uploaded content lands at `{prefix}/{uuid}_{slug}.{ext}`. The random
//! UUID guarantees global uniqueness; the slug exists purely to keep keys
//! recognizable to a human browsing the bucket. Two uploads of the same
//! title never collide.

use uuid::Uuid;

use crate::format;

/// Filesystem-safe slug derived from a title: alphanumerics, spaces,
/// hyphens, and underscores survive, everything else is stripped, then
/// surrounding whitespace is trimmed and spaces become underscores.
pub fn slugify_title(title: &str) -> String {
    title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .trim()
        .replace(' ', "_")
}

/// Build a globally-unique object key for an upload.
pub fn object_key(prefix: &str, title: &str, filename: &str) -> String {
    format!(
        "{}/{}_{}.{}",
        prefix,
        Uuid::new_v4(),
        slugify_title(title),
        format::key_extension(filename)
    )
}
