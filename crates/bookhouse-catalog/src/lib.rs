//! Bookhouse Catalog Store
//!
//! This crate implements the catalog metadata system - the component that knows
//! which books exist, who may see them, and where their content lives.
//!
//! ## Purpose
//!
//! While book content (PDF/EPUB files) lives in S3, the catalog tracks:
//! - **Books**: Bibliographic metadata, legal/provenance fields, and the
//!   object key of the stored content
//! - **Visibility**: Public/featured flags driving the browsing surfaces
//! - **Engagement**: View and download counters
//! - **Content Sources**: The reference table of upstream providers
//!
//! ## Why Do We Need This?
//!
//! Without the catalog, simple questions become impossible to answer efficiently:
//! - "Show philosophy books, newest first, page 3" → Must scan all of S3
//! - "Which books are featured?" → No flags anywhere
//! - "How often was Walden downloaded?" → No counters
//!
//! With the catalog, these queries are **instant** (< 1ms).
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐
//! │   REST API   │
//! └──────┬───────┘
//!        │ queries
//!        ▼
//! ┌──────────────┐     ┌─────────────────┐
//! │ Catalog Store│ ←──→│       S3        │
//! │   (SQLite)   │     │ (book content)  │
//! └──────────────┘     └─────────────────┘
//!   You are here
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use bookhouse_catalog::{CatalogStore, SqliteCatalogStore, NewBook, BookCriteria};
//! use bookhouse_catalog::{Sort, PageRequest};
//!
//! // Create store (runs migrations)
//! let store = SqliteCatalogStore::new("catalog.db").await?;
//!
//! // Register a book
//! let book = store.create_book(NewBook {
//!     title: "Walden".to_string(),
//!     author: Some("Henry David Thoreau".to_string()),
//!     copyright_status: Some("Public Domain".to_string()),
//!     ..Default::default()
//! }).await?;
//!
//! // Browse: public books matching "walden", newest first, first page
//! let criteria = BookCriteria {
//!     search: Some("walden".to_string()),
//!     ..Default::default()
//! };
//! let page = store.list_books(&criteria, Sort::default(), PageRequest::default()).await?;
//! println!("{} of {} books", page.books.len(), page.pagination.total_items);
//!
//! // Record a view
//! let views = store.record_view(book.id).await?;
//! ```
//!
//! ## Implementation Details
//!
//! ### Database Backend
//! - SQLite (embedded, zero-config, single-node)
//! - Timestamps as i64 (milliseconds since epoch)
//! - Tags stored as a JSON array string
//!
//! ### Schema Degradation
//! - The store probes the live schema once at construction
//! - Filters whose columns are missing fall back to weaker predicates or
//!   disappear; reads never fail because a column is absent
//! - This keeps the service running against older databases that predate
//!   the visibility and curation columns
//!
//! ### Thread Safety
//! - SQLx connection pool handles concurrent access
//! - Counter bumps are single atomic UPDATE statements
//! - Safe to share across async tasks via Arc<>

pub mod capabilities;
pub mod error;
mod query;
pub mod store;
pub mod types;

pub use capabilities::{SchemaCapabilities, PUBLIC_DOMAIN_STATUS, SEED_SOURCE, USER_UPLOAD_SOURCE};
pub use error::{CatalogError, Result};
pub use store::SqliteCatalogStore;
pub use types::*;

use async_trait::async_trait;

/// Catalog store trait - abstracts over different storage backends.
///
/// This trait defines the core interface for all catalog operations in
/// Bookhouse. It can be implemented by different backends (SQLite today,
/// Postgres later) while maintaining a consistent API for the rest of the
/// system.
///
/// ## Thread Safety
///
/// All implementations must be Send + Sync, allowing safe sharing across
/// async tasks via Arc<dyn CatalogStore>.
///
/// ## Error Handling
///
/// All methods return `Result<T>` which is `Result<T, CatalogError>`. Common
/// errors:
/// - `BookNotFound`: Requested book doesn't exist
/// - `Database`: Underlying database failure
///
/// Lookups distinguish absence from failure: `get_book` returns `Ok(None)`
/// for a missing row, while mutations on a missing row return
/// `BookNotFound`.
///
/// ## Examples
///
/// ```ignore
/// use bookhouse_catalog::{CatalogStore, SqliteCatalogStore};
/// use std::sync::Arc;
///
/// let store: Arc<dyn CatalogStore> = Arc::new(
///     SqliteCatalogStore::new("catalog.db").await?
/// );
///
/// if let Some(book) = store.get_book(1).await? {
///     println!("{} ({} views)", book.title, book.view_count);
/// }
/// ```
#[async_trait]
pub trait CatalogStore: Send + Sync {
    // ============================================================
    // BOOK CRUD
    // ============================================================

    /// Create a new book record.
    ///
    /// The store assigns the id and timestamps and resolves defaults for
    /// fields the input leaves unset (language "en", copyright status
    /// "unknown", verification date = insert time). Counters start at zero.
    ///
    /// # Arguments
    ///
    /// * `book` - Metadata for the new entry; see [`NewBook`]
    ///
    /// # Returns
    ///
    /// The stored record with its assigned id.
    ///
    /// # Errors
    ///
    /// - `Database`: Database operation failed
    async fn create_book(&self, book: NewBook) -> Result<Book>;

    /// Get a book by id.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Book))` if the book exists
    /// - `Ok(None)` if not found
    ///
    /// # Performance
    ///
    /// Very fast (< 100µs) as this is a primary key lookup.
    async fn get_book(&self, id: i64) -> Result<Option<Book>>;

    /// Apply a partial metadata update.
    ///
    /// `None` fields in the patch are left unchanged. Every call advances
    /// `updated_at`, even when the patch is empty.
    ///
    /// # Errors
    ///
    /// - `BookNotFound`: Book doesn't exist
    /// - `Database`: Database operation failed
    async fn update_book(&self, id: i64, patch: BookPatch) -> Result<Book>;

    /// Delete a book record.
    ///
    /// Note: This does NOT delete the content object from S3. The storage
    /// gateway handles object deletion before removing the record.
    ///
    /// # Errors
    ///
    /// - `BookNotFound`: Book doesn't exist
    /// - `Database`: Database operation failed
    async fn delete_book(&self, id: i64) -> Result<()>;

    // ============================================================
    // BROWSING AND SEARCH
    // ============================================================

    /// List books matching the criteria, sorted and paginated.
    ///
    /// The returned total counts every matching row, not just the page, so
    /// pagination metadata stays consistent with the filters.
    ///
    /// # Arguments
    ///
    /// * `criteria` - AND-combined filter predicates
    /// * `sort` - Sort key and direction; unknown keys fall back to newest
    ///   first
    /// * `page` - Page number and size (size capped at
    ///   [`PageRequest::MAX_PER_PAGE`])
    ///
    /// # Errors
    ///
    /// - `Database`: Database operation failed
    async fn list_books(
        &self,
        criteria: &BookCriteria,
        sort: Sort,
        page: PageRequest,
    ) -> Result<BookPage>;

    /// Featured books, newest first.
    ///
    /// Restricted to public rows. On schemas without the featured flag this
    /// degrades to seed content, and to an empty list when no fallback
    /// column exists either.
    async fn featured_books(&self, limit: u32) -> Result<Vec<Book>>;

    /// The curated public catalog: seed content, public-domain content, and
    /// explicitly public rows that are not user uploads.
    ///
    /// Featured books sort first, then title A-Z.
    ///
    /// # Arguments
    ///
    /// * `genre` - Optional substring genre filter; empty and "all" match
    ///   everything
    /// * `limit` - Maximum rows returned
    async fn public_books(&self, genre: Option<&str>, limit: u32) -> Result<Vec<Book>>;

    /// Books uploaded by users (rows with an uploaded file, excluding seed
    /// content), newest first.
    async fn user_uploads(&self, limit: u32) -> Result<Vec<Book>>;

    /// Autocomplete suggestions for a search box.
    ///
    /// Returns up to 5 distinct titles and 5 distinct non-empty authors
    /// matching the query as a substring, public books only. Queries
    /// shorter than 2 characters return empty buckets.
    async fn search_suggestions(&self, q: &str) -> Result<Suggestions>;

    // ============================================================
    // AGGREGATION
    // ============================================================

    /// Catalog statistics snapshot.
    ///
    /// The total book count is required and fails the call on error. Every
    /// other dimension (public/featured/recent counts and the grouped
    /// distributions) degrades to its zero value on failure, so one bad
    /// aggregate cannot take down the snapshot.
    ///
    /// # Errors
    ///
    /// - `Database`: The headline count failed
    async fn stats(&self) -> Result<CatalogStats>;

    // ============================================================
    // ENGAGEMENT COUNTERS
    // ============================================================

    /// Record one view and return the new total.
    ///
    /// The increment is a single atomic UPDATE; concurrent calls never lose
    /// updates.
    ///
    /// # Errors
    ///
    /// - `BookNotFound`: Book doesn't exist
    /// - `Database`: Database operation failed
    async fn record_view(&self, id: i64) -> Result<i64>;

    /// Record one download and return the new total.
    ///
    /// Same atomicity guarantee as [`record_view`](CatalogStore::record_view).
    async fn record_download(&self, id: i64) -> Result<i64>;

    // ============================================================
    // CURATION
    // ============================================================

    /// Set the featured flag.
    ///
    /// # Errors
    ///
    /// - `BookNotFound`: Book doesn't exist
    async fn set_featured(&self, id: i64, featured: bool) -> Result<Book>;

    /// Set public visibility.
    ///
    /// # Errors
    ///
    /// - `BookNotFound`: Book doesn't exist
    async fn set_visibility(&self, id: i64, public: bool) -> Result<Book>;

    // ============================================================
    // REFERENCE DATA
    // ============================================================

    /// List the upstream content providers, sorted by name.
    async fn list_sources(&self) -> Result<Vec<ContentSource>>;
}
