//! Schema Capability Detection
//!
//! The catalog has to run against databases that predate some optional
//! columns (legacy imports carry only a core subset of the books table).
//! Instead of probing per request, the store inspects the live schema once
//! at construction and keeps the result as a static policy object. The
//! query engine consults it when composing predicates and sort clauses and
//! silently narrows to the best available approximation; a reduced schema
//! is never a user-facing error.
//!
//! The fallback chains are fixed:
//!
//! - public visibility: `is_public` flag -> seed-source label -> all rows
//! - featured: `is_featured` flag -> seed-source label -> empty
//! - genre filter: `genre` column -> description substring -> dropped
//! - sort key: requested column -> `created_at DESC` -> `id DESC`

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::error::Result;
use crate::query::BOOK_COLUMNS;

/// Provenance label of curated seed content. Rows carrying it are treated
/// as public when the visibility flags are unavailable.
pub const SEED_SOURCE: &str = "Sample Data";

/// Provenance label of end-user uploads.
pub const USER_UPLOAD_SOURCE: &str = "User Upload";

/// Copyright status of public-domain content.
pub const PUBLIC_DOMAIN_STATUS: &str = "Public Domain";

/// The set of columns the live books table actually has.
///
/// Computed once at store construction; cheap to clone and consult.
#[derive(Debug, Clone)]
pub struct SchemaCapabilities {
    columns: HashSet<String>,
}

impl SchemaCapabilities {
    /// Inspect the live schema. Runs one `pragma_table_info` query.
    pub async fn probe(pool: &SqlitePool) -> Result<Self> {
        let columns: Vec<String> =
            sqlx::query_scalar("SELECT name FROM pragma_table_info('books')")
                .fetch_all(pool)
                .await?;
        let caps = Self {
            columns: columns.into_iter().collect(),
        };

        let missing = caps.missing_columns();
        if missing.is_empty() {
            tracing::debug!("books schema is complete");
        } else {
            tracing::warn!(
                missing = ?missing,
                "books table is missing optional columns; queries will degrade"
            );
        }

        Ok(caps)
    }

    /// Whether the books table has `column`.
    pub fn has(&self, column: &str) -> bool {
        self.columns.contains(column)
    }

    /// Canonical columns absent from the live schema.
    pub fn missing_columns(&self) -> Vec<&'static str> {
        BOOK_COLUMNS
            .iter()
            .copied()
            .filter(|c| !self.has(c))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_columns().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_pool() -> SqlitePool {
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn probe_reports_complete_schema() {
        let pool = test_pool().await;
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();

        let caps = SchemaCapabilities::probe(&pool).await.unwrap();
        assert!(caps.is_complete());
        assert!(caps.has("is_public"));
        assert!(caps.has("view_count"));
    }

    #[tokio::test]
    async fn probe_reports_missing_columns() {
        let pool = test_pool().await;
        sqlx::query(
            "CREATE TABLE books (
                id INTEGER PRIMARY KEY,
                title TEXT NOT NULL,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        let caps = SchemaCapabilities::probe(&pool).await.unwrap();
        assert!(!caps.is_complete());
        assert!(caps.has("title"));
        assert!(!caps.has("is_public"));
        assert!(caps.missing_columns().contains(&"genre"));
    }
}
