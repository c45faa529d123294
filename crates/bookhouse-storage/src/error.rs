//! Storage Error Types
//!
//! This module defines all error types that can occur during content gateway
//! operations.
//!
//! ## Error Categories
//!
//! ### Validation Errors
//! - `UnsupportedFormat`: Upload rejected before anything is written
//!
//! ### Content Errors
//! - `MissingContent`: The book exists but has no stored object
//!
//! ### Object Store Errors
//! - `ObjectStore`: Low-level object store operation failed
//! - `Presign`: Signed URL generation failed
//!
//! ### Catalog Errors
//! - `Catalog`: Catalog store operation failed (including `BookNotFound`)
//!
//! ## Usage
//!
//! All gateway operations return `Result<T>` which is aliased to
//! `Result<T, Error>`. This allows clean error propagation with `?`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported file type: {0}. Allowed: PDF, EPUB, HTML, TXT")]
    UnsupportedFormat(String),

    #[error("Book {0} has no stored content")]
    MissingContent(i64),

    #[error("Signed URL generation failed: {0}")]
    Presign(String),

    #[error("Object store error: {0}")]
    ObjectStore(#[from] object_store::Error),

    #[error("Catalog error: {0}")]
    Catalog(#[from] bookhouse_catalog::CatalogError),
}

impl Error {
    /// True when the error indicates a missing book or missing content
    /// rather than an infrastructure failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::MissingContent(_)
                | Error::Catalog(bookhouse_catalog::CatalogError::BookNotFound(_))
                | Error::ObjectStore(object_store::Error::NotFound { .. })
        )
    }
}
