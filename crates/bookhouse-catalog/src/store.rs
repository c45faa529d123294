//! SQLite Catalog Store Implementation
//!
//! This module implements the CatalogStore trait using SQLite as the backend.
//!
//! ## What Does This Do?
//!
//! SqliteCatalogStore provides persistent storage for all Bookhouse catalog
//! metadata:
//! - Book records with bibliographic, legal, and storage fields
//! - View/download counters
//! - The content_sources reference table
//!
//! ## Why SQLite?
//!
//! For a single-node deployment, SQLite is ideal:
//! - **Zero configuration**: Embedded database, no separate server
//! - **ACID transactions**: Data safety and consistency
//! - **Low latency**: < 1ms for indexed queries
//! - **Easy migration**: Can switch to Postgres later with minimal changes
//!
//! ## Usage
//!
//! ### File-Based (Production)
//! ```ignore
//! use bookhouse_catalog::{CatalogStore, SqliteCatalogStore};
//!
//! // Creates catalog.db file (or opens if exists)
//! let store = SqliteCatalogStore::new("catalog.db").await?;
//! let book = store.get_book(1).await?;
//! ```
//!
//! ### In-Memory (Testing)
//! ```ignore
//! let store = SqliteCatalogStore::new_in_memory().await?;
//! ```
//!
//! ## Implementation Details
//!
//! ### Connection Pool
//! - File-based stores use an SQLx pool with 10 connections
//! - In-memory stores are pinned to a single connection; every `:memory:`
//!   connection is its own empty database
//!
//! ### Migrations and Capability Probe
//! - `new`/`new_in_memory` run migrations via sqlx::migrate! on startup
//! - `from_pool` takes the schema as-is (externally managed databases) and
//!   only probes capabilities
//! - The capability probe runs once per store; queries consult the cached
//!   result when composing predicates
//!
//! ### Counters
//! - Counter bumps are single `UPDATE ... SET c = c + 1` statements, so
//!   concurrent increments never lose updates
//! - Every mutating statement sets `updated_at = MAX(now, updated_at + 1)`,
//!   which keeps `updated_at` strictly increasing even within one
//!   millisecond
//!
//! ## Thread Safety
//!
//! - SqliteCatalogStore is Send + Sync
//! - Can be safely shared via Arc<SqliteCatalogStore>

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::QueryBuilder;

use crate::capabilities::{SchemaCapabilities, SEED_SOURCE};
use crate::error::{CatalogError, Result};
use crate::query;
use crate::types::*;
use crate::CatalogStore;

const SUGGESTION_LIMIT: i64 = 5;
const TOP_N_LIMIT: i64 = 10;
const RECENT_WINDOW_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// SQLite-based catalog store implementation
pub struct SqliteCatalogStore {
    pool: SqlitePool,
    caps: SchemaCapabilities,
}

impl SqliteCatalogStore {
    /// Create a new SQLite catalog store, running migrations on startup.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let options =
            SqliteConnectOptions::from_str(&format!("sqlite://{}", path.as_ref().display()))?
                .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Self::from_pool(pool).await
    }

    /// Create an in-memory database (for testing).
    pub async fn new_in_memory() -> Result<Self> {
        // One connection only: each :memory: connection is its own database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool without running migrations. The schema is taken
    /// as-is and the capability probe decides which predicates are
    /// available; reads against a reduced legacy schema degrade instead of
    /// erroring.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        let caps = SchemaCapabilities::probe(&pool).await?;
        Ok(Self { pool, caps })
    }

    /// The capability policy computed at construction.
    pub fn capabilities(&self) -> &SchemaCapabilities {
        &self.caps
    }

    fn now_ms() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    async fn fetch_book(&self, id: i64) -> Result<Option<Book>> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(query::select_columns(&self.caps));
        qb.push(" FROM books WHERE id = ");
        qb.push_bind(id);

        let row = qb
            .build_query_as::<BookRow>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Book::from))
    }

    async fn fetch_books(&self, qb: &mut QueryBuilder<'_, sqlx::Sqlite>) -> Result<Vec<Book>> {
        let rows = qb.build_query_as::<BookRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Book::from).collect())
    }
}

/// Raw row shape shared by every book SELECT. Columns missing from a legacy
/// schema come back as NULL and get backfilled with catalog defaults in the
/// `Book` conversion.
#[derive(sqlx::FromRow)]
struct BookRow {
    id: i64,
    title: String,
    author: Option<String>,
    description: Option<String>,
    genre: Option<String>,
    publication_year: Option<i64>,
    language: Option<String>,
    tags: Option<String>,
    copyright_status: Option<String>,
    license: Option<String>,
    source: Option<String>,
    source_url: Option<String>,
    attribution_required: Option<bool>,
    commercial_use_allowed: Option<bool>,
    verification_date: Option<i64>,
    legal_notes: Option<String>,
    filename: Option<String>,
    object_key: Option<String>,
    file_size: Option<i64>,
    page_count: Option<i64>,
    cover_url: Option<String>,
    is_public: Option<bool>,
    is_featured: Option<bool>,
    view_count: Option<i64>,
    download_count: Option<i64>,
    created_at: Option<i64>,
    updated_at: Option<i64>,
}

impl From<BookRow> for Book {
    fn from(r: BookRow) -> Self {
        Book {
            id: r.id,
            title: r.title,
            author: r.author,
            description: r.description,
            genre: r.genre,
            publication_year: r.publication_year,
            language: r.language.unwrap_or_else(|| "en".to_string()),
            tags: r
                .tags
                .as_deref()
                .and_then(|t| serde_json::from_str(t).ok()),
            copyright_status: r.copyright_status.unwrap_or_else(|| "unknown".to_string()),
            license: r.license,
            source: r.source,
            source_url: r.source_url,
            attribution_required: r.attribution_required.unwrap_or(false),
            commercial_use_allowed: r.commercial_use_allowed.unwrap_or(true),
            verification_date: r.verification_date,
            legal_notes: r.legal_notes,
            filename: r.filename,
            object_key: r.object_key,
            file_size: r.file_size,
            page_count: r.page_count,
            cover_url: r.cover_url,
            is_public: r.is_public.unwrap_or(true),
            is_featured: r.is_featured.unwrap_or(false),
            view_count: r.view_count.unwrap_or(0),
            download_count: r.download_count.unwrap_or(0),
            created_at: r.created_at.unwrap_or(0),
            updated_at: r.updated_at.unwrap_or(0),
        }
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalogStore {
    async fn create_book(&self, book: NewBook) -> Result<Book> {
        let now = Self::now_ms();
        let tags_json = match &book.tags {
            Some(tags) => Some(serde_json::to_string(tags)?),
            None => None,
        };

        let result = sqlx::query(
            r#"
            INSERT INTO books (
                title, author, description, genre, publication_year, language,
                tags, copyright_status, license, source, source_url,
                attribution_required, commercial_use_allowed, verification_date,
                legal_notes, filename, object_key, file_size, page_count,
                cover_url, is_public, is_featured, view_count, download_count,
                created_at, updated_at
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?)
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.description)
        .bind(&book.genre)
        .bind(book.publication_year)
        .bind(book.language.as_deref().unwrap_or("en"))
        .bind(tags_json)
        .bind(book.copyright_status.as_deref().unwrap_or("unknown"))
        .bind(&book.license)
        .bind(&book.source)
        .bind(&book.source_url)
        .bind(book.attribution_required)
        .bind(book.commercial_use_allowed)
        .bind(book.verification_date.unwrap_or(now))
        .bind(&book.legal_notes)
        .bind(&book.filename)
        .bind(&book.object_key)
        .bind(book.file_size)
        .bind(book.page_count)
        .bind(&book.cover_url)
        .bind(book.is_public)
        .bind(book.is_featured)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        self.fetch_book(id)
            .await?
            .ok_or(CatalogError::BookNotFound(id))
    }

    async fn get_book(&self, id: i64) -> Result<Option<Book>> {
        self.fetch_book(id).await
    }

    async fn update_book(&self, id: i64, patch: BookPatch) -> Result<Book> {
        let now = Self::now_ms();
        let tags_json = match &patch.tags {
            Some(tags) => Some(serde_json::to_string(tags)?),
            None => None,
        };

        // Even an empty patch advances updated_at; MAX keeps it strictly
        // increasing when two mutations land in the same millisecond.
        let mut qb = QueryBuilder::new("UPDATE books SET updated_at = MAX(");
        qb.push_bind(now);
        qb.push(", updated_at + 1)");

        if let Some(title) = &patch.title {
            qb.push(", title = ").push_bind(title.clone());
        }
        if let Some(author) = &patch.author {
            qb.push(", author = ").push_bind(author.clone());
        }
        if let Some(description) = &patch.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(cover_url) = &patch.cover_url {
            qb.push(", cover_url = ").push_bind(cover_url.clone());
        }
        if let Some(status) = &patch.copyright_status {
            qb.push(", copyright_status = ").push_bind(status.clone());
        }
        if let Some(license) = &patch.license {
            qb.push(", license = ").push_bind(license.clone());
        }
        if let Some(source) = &patch.source {
            qb.push(", source = ").push_bind(source.clone());
        }
        if let Some(source_url) = &patch.source_url {
            qb.push(", source_url = ").push_bind(source_url.clone());
        }
        if let Some(notes) = &patch.legal_notes {
            qb.push(", legal_notes = ").push_bind(notes.clone());
        }
        if let Some(attribution) = patch.attribution_required {
            qb.push(", attribution_required = ").push_bind(attribution);
        }
        if let Some(commercial) = patch.commercial_use_allowed {
            qb.push(", commercial_use_allowed = ").push_bind(commercial);
        }
        if let Some(language) = &patch.language {
            qb.push(", language = ").push_bind(language.clone());
        }
        if let Some(year) = patch.publication_year {
            qb.push(", publication_year = ").push_bind(year);
        }
        if let Some(genre) = &patch.genre {
            qb.push(", genre = ").push_bind(genre.clone());
        }
        if let Some(tags) = tags_json {
            qb.push(", tags = ").push_bind(tags);
        }
        if let Some(pages) = patch.page_count {
            qb.push(", page_count = ").push_bind(pages);
        }
        if let Some(public) = patch.is_public {
            qb.push(", is_public = ").push_bind(public);
        }
        if let Some(featured) = patch.is_featured {
            qb.push(", is_featured = ").push_bind(featured);
        }

        qb.push(" WHERE id = ");
        qb.push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        if result.rows_affected() == 0 {
            return Err(CatalogError::BookNotFound(id));
        }

        self.fetch_book(id)
            .await?
            .ok_or(CatalogError::BookNotFound(id))
    }

    async fn delete_book(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected == 0 {
            return Err(CatalogError::BookNotFound(id));
        }
        Ok(())
    }

    async fn list_books(
        &self,
        criteria: &BookCriteria,
        sort: Sort,
        page: PageRequest,
    ) -> Result<BookPage> {
        // COUNT over the same predicates so totals agree with the page.
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM books");
        let mut has_where = false;
        query::push_criteria(&mut count_qb, &mut has_where, criteria, &self.caps);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(query::select_columns(&self.caps));
        qb.push(" FROM books");
        let mut has_where = false;
        query::push_criteria(&mut qb, &mut has_where, criteria, &self.caps);
        query::push_order(&mut qb, sort, &self.caps);
        qb.push(" LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let books = self.fetch_books(&mut qb).await?;

        Ok(BookPage {
            books,
            pagination: Pagination::new(page, total),
        })
    }

    async fn featured_books(&self, limit: u32) -> Result<Vec<Book>> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(query::select_columns(&self.caps));
        qb.push(" FROM books");
        let mut has_where = false;
        query::push_public(&mut qb, &mut has_where, &self.caps);
        query::push_featured(&mut qb, &mut has_where, &self.caps);
        query::push_order(&mut qb, Sort::default(), &self.caps);
        qb.push(" LIMIT ");
        qb.push_bind(limit as i64);

        self.fetch_books(&mut qb).await
    }

    async fn public_books(&self, genre: Option<&str>, limit: u32) -> Result<Vec<Book>> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(query::select_columns(&self.caps));
        qb.push(" FROM books");

        let mut has_where = false;
        query::push_public_catalog(&mut qb, &mut has_where, &self.caps);

        // "all" is the wire-level wildcard
        if let Some(genre) = genre.filter(|g| !g.is_empty() && *g != "all") {
            query::push_genre(&mut qb, &mut has_where, genre, &self.caps);
        }

        if self.caps.has("is_featured") {
            qb.push(" ORDER BY is_featured DESC, title ASC");
        } else {
            qb.push(" ORDER BY title ASC");
        }
        qb.push(" LIMIT ");
        qb.push_bind(limit as i64);

        self.fetch_books(&mut qb).await
    }

    async fn user_uploads(&self, limit: u32) -> Result<Vec<Book>> {
        if !self.caps.has("filename") {
            tracing::debug!("filename unavailable; no rows qualify as user uploads");
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(query::select_columns(&self.caps));
        qb.push(" FROM books WHERE filename IS NOT NULL");
        if self.caps.has("source") {
            // NULL source does not qualify; upload paths always label rows
            qb.push(" AND source <> ");
            qb.push_bind(SEED_SOURCE);
        }
        if self.caps.has("object_key") {
            qb.push(" AND object_key IS NOT NULL");
        }
        query::push_order(&mut qb, Sort::default(), &self.caps);
        qb.push(" LIMIT ");
        qb.push_bind(limit as i64);

        self.fetch_books(&mut qb).await
    }

    async fn search_suggestions(&self, q: &str) -> Result<Suggestions> {
        if q.trim().chars().count() < 2 {
            return Ok(Suggestions::default());
        }
        let pattern = format!("%{}%", q);

        let mut title_qb = QueryBuilder::new("SELECT DISTINCT title FROM books");
        let mut has_where = false;
        query::push_public(&mut title_qb, &mut has_where, &self.caps);
        query::push_and(&mut title_qb, &mut has_where);
        title_qb.push("title LIKE ").push_bind(pattern.clone());
        title_qb.push(" LIMIT ");
        title_qb.push_bind(SUGGESTION_LIMIT);

        let titles: Vec<Option<String>> = title_qb
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await?;

        let authors: Vec<Option<String>> = if self.caps.has("author") {
            let mut author_qb = QueryBuilder::new("SELECT DISTINCT author FROM books");
            let mut has_where = false;
            query::push_public(&mut author_qb, &mut has_where, &self.caps);
            query::push_and(&mut author_qb, &mut has_where);
            author_qb.push("author LIKE ").push_bind(pattern);
            author_qb.push(" AND author IS NOT NULL AND author <> ''");
            author_qb.push(" LIMIT ");
            author_qb.push_bind(SUGGESTION_LIMIT);
            author_qb
                .build_query_scalar()
                .fetch_all(&self.pool)
                .await?
        } else {
            Vec::new()
        };

        Ok(Suggestions {
            titles: titles.into_iter().flatten().collect(),
            authors: authors.into_iter().flatten().collect(),
        })
    }

    async fn stats(&self) -> Result<CatalogStats> {
        // The headline count is required; every other dimension degrades to
        // its zero value on failure so one bad aggregate cannot take down
        // the whole snapshot.
        let total_books: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let public_books = {
            let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM books");
            let mut has_where = false;
            query::push_public(&mut qb, &mut has_where, &self.caps);
            match qb.build_query_scalar().fetch_one(&self.pool).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(error = %e, "public count failed; degrading to 0");
                    0
                }
            }
        };

        let featured_books = {
            let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM books");
            let mut has_where = false;
            query::push_featured(&mut qb, &mut has_where, &self.caps);
            match qb.build_query_scalar().fetch_one(&self.pool).await {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(error = %e, "featured count failed; degrading to 0");
                    0
                }
            }
        };

        let recent_uploads = if self.caps.has("created_at") {
            let cutoff = Self::now_ms() - RECENT_WINDOW_MS;
            match sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE created_at >= ?")
                .bind(cutoff)
                .fetch_one(&self.pool)
                .await
            {
                Ok(n) => n,
                Err(e) => {
                    tracing::warn!(error = %e, "recent count failed; degrading to 0");
                    0
                }
            }
        } else {
            0
        };

        let copyright_distribution =
            self.facet("copyright_status", None).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "copyright distribution failed; degrading to empty");
                Vec::new()
            });

        let language_distribution =
            self.facet("language", Some(TOP_N_LIMIT)).await.unwrap_or_else(|e| {
                tracing::warn!(error = %e, "language distribution failed; degrading to empty");
                Vec::new()
            });

        let top_authors = self.author_facet().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "top authors failed; degrading to empty");
            Vec::new()
        });

        Ok(CatalogStats {
            total_books,
            public_books,
            featured_books,
            recent_uploads,
            copyright_distribution,
            language_distribution,
            top_authors,
        })
    }

    async fn record_view(&self, id: i64) -> Result<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            "UPDATE books SET view_count = view_count + 1,
             updated_at = MAX(?, updated_at + 1)
             WHERE id = ? RETURNING view_count",
        )
        .bind(Self::now_ms())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        total.ok_or(CatalogError::BookNotFound(id))
    }

    async fn record_download(&self, id: i64) -> Result<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            "UPDATE books SET download_count = download_count + 1,
             updated_at = MAX(?, updated_at + 1)
             WHERE id = ? RETURNING download_count",
        )
        .bind(Self::now_ms())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        total.ok_or(CatalogError::BookNotFound(id))
    }

    async fn set_featured(&self, id: i64, featured: bool) -> Result<Book> {
        let rows_affected = sqlx::query(
            "UPDATE books SET is_featured = ?, updated_at = MAX(?, updated_at + 1) WHERE id = ?",
        )
        .bind(featured)
        .bind(Self::now_ms())
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(CatalogError::BookNotFound(id));
        }
        self.fetch_book(id)
            .await?
            .ok_or(CatalogError::BookNotFound(id))
    }

    async fn set_visibility(&self, id: i64, public: bool) -> Result<Book> {
        let rows_affected = sqlx::query(
            "UPDATE books SET is_public = ?, updated_at = MAX(?, updated_at + 1) WHERE id = ?",
        )
        .bind(public)
        .bind(Self::now_ms())
        .bind(id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected == 0 {
            return Err(CatalogError::BookNotFound(id));
        }
        self.fetch_book(id)
            .await?
            .ok_or(CatalogError::BookNotFound(id))
    }

    async fn list_sources(&self) -> Result<Vec<ContentSource>> {
        let sources = sqlx::query_as::<_, ContentSource>(
            "SELECT id, name, base_url, api_endpoint, is_trusted, default_license,
             requires_attribution, notes, created_at
             FROM content_sources ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(sources)
    }
}

impl SqliteCatalogStore {
    /// Grouped counts for one column over public rows, descending, with an
    /// optional top-N bound. Ties resolve in store natural order.
    async fn facet(&self, column: &str, limit: Option<i64>) -> Result<Vec<FacetCount>> {
        if !self.caps.has(column) {
            tracing::debug!(column, "facet column unavailable; degrading to empty");
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(column);
        qb.push(", COUNT(*) AS n FROM books");
        let mut has_where = false;
        query::push_public(&mut qb, &mut has_where, &self.caps);
        qb.push(" GROUP BY ");
        qb.push(column);
        qb.push(" ORDER BY n DESC");
        if let Some(limit) = limit {
            qb.push(" LIMIT ");
            qb.push_bind(limit);
        }

        let rows: Vec<(Option<String>, i64)> =
            qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(value, count)| FacetCount {
                value: value.unwrap_or_else(|| "unknown".to_string()),
                count,
            })
            .collect())
    }

    /// Top authors by book count; NULL and empty authors excluded.
    async fn author_facet(&self) -> Result<Vec<FacetCount>> {
        if !self.caps.has("author") {
            tracing::debug!("author unavailable; degrading to empty");
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::new(
            "SELECT author, COUNT(*) AS n FROM books",
        );
        let mut has_where = false;
        query::push_public(&mut qb, &mut has_where, &self.caps);
        query::push_and(&mut qb, &mut has_where);
        qb.push("author IS NOT NULL AND author <> ''");
        qb.push(" GROUP BY author ORDER BY n DESC LIMIT ");
        qb.push_bind(TOP_N_LIMIT);

        let rows: Vec<(Option<String>, i64)> =
            qb.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|(value, count)| FacetCount {
                value: value.unwrap_or_default(),
                count,
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_test_store() -> SqliteCatalogStore {
        SqliteCatalogStore::new_in_memory()
            .await
            .expect("Failed to create test store")
    }

    fn sample_book(title: &str) -> NewBook {
        NewBook {
            title: title.to_string(),
            author: Some("Test Author".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_and_get_book() {
        let store = setup_test_store().await;

        let created = store.create_book(sample_book("Walden")).await.unwrap();
        assert!(created.id > 0);
        assert_eq!(created.title, "Walden");
        assert_eq!(created.language, "en");
        assert_eq!(created.copyright_status, "unknown");
        assert!(created.is_public);
        assert!(!created.is_featured);
        assert!(created.commercial_use_allowed);
        assert!(created.verification_date.is_some());
        assert_eq!(created.view_count, 0);
        assert_eq!(created.download_count, 0);
        assert_eq!(created.created_at, created.updated_at);

        let fetched = store.get_book(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn get_missing_book_returns_none() {
        let store = setup_test_store().await;
        assert!(store.get_book(9999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = setup_test_store().await;

        let first = store.create_book(sample_book("First")).await.unwrap();
        store.delete_book(first.id).await.unwrap();
        let second = store.create_book(sample_book("Second")).await.unwrap();

        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn tags_round_trip() {
        let store = setup_test_store().await;

        let mut book = sample_book("Tagged");
        book.tags = Some(vec!["classic".to_string(), "nature".to_string()]);
        let created = store.create_book(book).await.unwrap();

        let fetched = store.get_book(created.id).await.unwrap().unwrap();
        assert_eq!(
            fetched.tags,
            Some(vec!["classic".to_string(), "nature".to_string()])
        );
    }

    #[tokio::test]
    async fn update_book_applies_patch_and_bumps_updated_at() {
        let store = setup_test_store().await;
        let created = store.create_book(sample_book("Patchable")).await.unwrap();

        let patch = BookPatch {
            genre: Some("Philosophy".to_string()),
            ..Default::default()
        };
        let updated = store.update_book(created.id, patch).await.unwrap();

        assert_eq!(updated.genre.as_deref(), Some("Philosophy"));
        assert_eq!(updated.title, "Patchable");
        assert!(updated.updated_at > created.updated_at);
        assert!(updated.updated_at >= updated.created_at);
    }

    #[tokio::test]
    async fn empty_patch_still_bumps_updated_at() {
        let store = setup_test_store().await;
        let created = store.create_book(sample_book("Touched")).await.unwrap();

        let updated = store
            .update_book(created.id, BookPatch::default())
            .await
            .unwrap();
        assert!(updated.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn update_missing_book_fails() {
        let store = setup_test_store().await;
        let err = store
            .update_book(42, BookPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::BookNotFound(42)));
    }

    #[tokio::test]
    async fn delete_book_removes_row() {
        let store = setup_test_store().await;
        let created = store.create_book(sample_book("Doomed")).await.unwrap();

        store.delete_book(created.id).await.unwrap();
        assert!(store.get_book(created.id).await.unwrap().is_none());

        let err = store.delete_book(created.id).await.unwrap_err();
        assert!(matches!(err, CatalogError::BookNotFound(_)));
    }

    #[tokio::test]
    async fn counters_increment_by_one() {
        let store = setup_test_store().await;
        let created = store.create_book(sample_book("Counted")).await.unwrap();

        assert_eq!(store.record_view(created.id).await.unwrap(), 1);
        assert_eq!(store.record_view(created.id).await.unwrap(), 2);
        assert_eq!(store.record_download(created.id).await.unwrap(), 1);

        let fetched = store.get_book(created.id).await.unwrap().unwrap();
        assert_eq!(fetched.view_count, 2);
        assert_eq!(fetched.download_count, 1);
        assert!(fetched.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn counters_on_missing_book_fail() {
        let store = setup_test_store().await;
        assert!(matches!(
            store.record_view(1).await.unwrap_err(),
            CatalogError::BookNotFound(1)
        ));
        assert!(matches!(
            store.record_download(1).await.unwrap_err(),
            CatalogError::BookNotFound(1)
        ));
    }

    #[tokio::test]
    async fn set_featured_and_visibility() {
        let store = setup_test_store().await;
        let created = store.create_book(sample_book("Toggled")).await.unwrap();

        let featured = store.set_featured(created.id, true).await.unwrap();
        assert!(featured.is_featured);

        let hidden = store.set_visibility(created.id, false).await.unwrap();
        assert!(!hidden.is_public);
        assert!(hidden.updated_at > featured.updated_at);
    }

    #[tokio::test]
    async fn list_sources_reads_reference_table() {
        let store = setup_test_store().await;
        assert!(store.list_sources().await.unwrap().is_empty());

        sqlx::query(
            "INSERT INTO content_sources (name, base_url, is_trusted, requires_attribution, created_at)
             VALUES ('Project Gutenberg', 'https://www.gutenberg.org', 1, 0, 0)",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let sources = store.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].name, "Project Gutenberg");
        assert!(sources[0].is_trusted);
    }
}
