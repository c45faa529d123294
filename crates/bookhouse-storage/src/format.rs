//! Upload Format Validation
//!
//! The gateway accepts a small closed set of document formats. A file is
//! admitted when EITHER its declared content type OR its filename extension
//! is on the allow-list; requiring both would reject the common case of
//! browsers uploading EPUBs as `application/octet-stream`.
//!
//! Validation happens before anything is written, so a rejected upload
//! leaves no object and no catalog row behind.

use crate::error::{Error, Result};

/// Filename extensions the gateway accepts (compared lowercased).
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "epub", "html", "htm", "txt"];

/// Declared content types the gateway accepts. Browsers are inconsistent
/// about EPUB types, and `application/octet-stream` is what most send for
/// anything unrecognized, so those are all admitted and the extension
/// decides the served content type later.
const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "application/epub+zip",
    "application/epub",
    "text/html",
    "text/plain",
    "application/octet-stream",
];

/// The last dot-separated segment of a filename, if any. Case preserved.
pub fn extension(filename: &str) -> Option<&str> {
    filename.rsplit_once('.').map(|(_, ext)| ext)
}

/// Extension used when building object keys: the raw filename extension,
/// falling back to "pdf".
pub fn key_extension(filename: &str) -> &str {
    extension(filename).unwrap_or("pdf")
}

/// Extension used on the delivery path: lowercased, from the stored
/// filename, falling back to "pdf" for rows without one.
pub fn delivery_extension(filename: Option<&str>) -> String {
    filename
        .and_then(extension)
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| "pdf".to_string())
}

/// Content type served for a (lowercased) extension. Unknown extensions
/// serve as PDF.
pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "pdf" => "application/pdf",
        "epub" => "application/epub+zip",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        _ => "application/pdf",
    }
}

/// Check an upload against the allow-lists.
///
/// # Errors
///
/// `UnsupportedFormat` when neither the content type nor the extension is
/// allowed. Nothing has been written at that point.
pub fn validate(content_type: Option<&str>, filename: &str) -> Result<()> {
    let type_ok = content_type.map_or(false, |ct| ALLOWED_CONTENT_TYPES.contains(&ct));
    let ext = extension(filename)
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    let ext_ok = ALLOWED_EXTENSIONS.contains(&ext.as_str());

    if type_ok || ext_ok {
        Ok(())
    } else {
        let label = content_type
            .map(str::to_string)
            .unwrap_or_else(|| filename.to_string());
        Err(Error::UnsupportedFormat(label))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_by_content_type() {
        assert!(validate(Some("application/pdf"), "book").is_ok());
        assert!(validate(Some("application/octet-stream"), "book.bin").is_ok());
    }

    #[test]
    fn accepts_by_extension_alone() {
        // Wrong declared type, good extension
        assert!(validate(Some("application/x-unknown"), "walden.epub").is_ok());
        assert!(validate(None, "walden.txt").is_ok());
        // Extension comparison ignores case
        assert!(validate(None, "WALDEN.PDF").is_ok());
    }

    #[test]
    fn rejects_disallowed_uploads() {
        let err = validate(Some("application/msword"), "walden.docx").unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
        assert!(validate(None, "no_extension_here").is_err());
    }

    #[test]
    fn key_extension_falls_back_to_pdf() {
        assert_eq!(key_extension("walden.epub"), "epub");
        assert_eq!(key_extension("walden"), "pdf");
        // Raw case is preserved for key building
        assert_eq!(key_extension("walden.EPUB"), "EPUB");
    }

    #[test]
    fn delivery_extension_normalizes() {
        assert_eq!(delivery_extension(Some("walden.EPUB")), "epub");
        assert_eq!(delivery_extension(Some("walden")), "pdf");
        assert_eq!(delivery_extension(None), "pdf");
    }

    #[test]
    fn content_types_cover_the_allow_list() {
        assert_eq!(content_type_for("pdf"), "application/pdf");
        assert_eq!(content_type_for("epub"), "application/epub+zip");
        assert_eq!(content_type_for("htm"), "text/html");
        assert_eq!(content_type_for("txt"), "text/plain");
        assert_eq!(content_type_for("weird"), "application/pdf");
    }
}
