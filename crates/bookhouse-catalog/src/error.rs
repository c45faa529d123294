//! Catalog Error Types
//!
//! All catalog store operations return `Result<T>`, aliased to
//! `Result<T, CatalogError>`, so errors propagate cleanly with `?`.
//!
//! ## Error Categories
//!
//! ### Lookup Errors
//! - `BookNotFound`: the referenced book id does not exist
//!
//! ### Database Errors
//! - `Database`: SQLite operation failed (connection, query, constraint)
//! - `Migration`: embedded migration failed to apply
//!
//! ### Data Errors
//! - `Serialization`: the tags JSON column failed to encode/decode

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Book not found: {0}")]
    BookNotFound(i64),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl From<sqlx::migrate::MigrateError> for CatalogError {
    fn from(e: sqlx::migrate::MigrateError) -> Self {
        CatalogError::Migration(e.to_string())
    }
}
