//! Catalog Type Definitions
//!
//! This module defines all the data structures used by the catalog store.
//!
//! ## Types Overview
//!
//! ### Book
//! A complete catalog entry: bibliographic metadata, legal/provenance fields,
//! storage details, visibility flags, and usage counters.
//!
//! ### NewBook
//! Input for creating a catalog entry. Optional fields fall back to the
//! catalog defaults (language "en", copyright status "unknown", public).
//!
//! ### BookPatch
//! Partial metadata update. `None` means "leave unchanged"; there is no way
//! to null a field out through a patch.
//!
//! ### BookCriteria / Sort / PageRequest
//! Typed inputs to the list query: filter predicates (AND-combined), an
//! enumerated sort key with direction, and 1-indexed pagination bounds.
//!
//! ### Pagination / BookPage
//! The page of results plus the derived pagination metadata callers need to
//! render pagers (total pages, has_next/has_previous).
//!
//! ### CatalogStats / FacetCount / Suggestions
//! Aggregation snapshot and autocomplete buckets.
//!
//! ## Design Decisions
//!
//! - All types are Serialize/Deserialize for storage and API responses
//! - Timestamps are i64 (milliseconds since epoch) for simplicity
//! - `tags` round-trips through a JSON TEXT column
//! - Sort keys are a closed enum; unknown inputs fall back to newest-first

use serde::{Deserialize, Serialize};

/// A complete catalog entry.
///
/// This is returned by `CatalogStore::get_book()` and every listing
/// operation. Rows read from a reduced legacy schema have the missing
/// columns backfilled with the catalog defaults.
///
/// # Fields
///
/// * `id` - Store-assigned identifier, unique and never reused
/// * `object_key` - Key of the backing object; `Some` implies the object was
///   uploaded before this row was inserted
/// * `view_count` / `download_count` - Monotonic usage counters
/// * `created_at` / `updated_at` - Milliseconds since epoch;
///   `updated_at >= created_at` and strictly increases on every mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Book {
    /// Store-assigned identifier (unique, never reused)
    pub id: i64,

    /// Title (required)
    pub title: String,

    /// Author name, if known
    pub author: Option<String>,

    /// Free-text description
    pub description: Option<String>,

    /// Genre label
    pub genre: Option<String>,

    /// Year of first publication
    pub publication_year: Option<i64>,

    /// ISO language code (default "en")
    pub language: String,

    /// Ordered list of tags
    pub tags: Option<Vec<String>>,

    /// Copyright status label (default "unknown")
    pub copyright_status: String,

    /// License identifier or name
    pub license: Option<String>,

    /// Provenance label, e.g. "Sample Data" or "User Upload"
    pub source: Option<String>,

    /// URL the content was obtained from
    pub source_url: Option<String>,

    /// Whether redistribution requires attribution
    pub attribution_required: bool,

    /// Whether commercial use is allowed
    pub commercial_use_allowed: bool,

    /// When the copyright status was verified (ms since epoch)
    pub verification_date: Option<i64>,

    /// Free-text legal notes
    pub legal_notes: Option<String>,

    /// Original filename at upload time
    pub filename: Option<String>,

    /// Object store key of the content
    pub object_key: Option<String>,

    /// Content size in bytes (actual stream length at upload)
    pub file_size: Option<i64>,

    /// Page count, if known
    pub page_count: Option<i64>,

    /// Cover image URL
    pub cover_url: Option<String>,

    /// Whether the book is publicly visible (default true)
    pub is_public: bool,

    /// Whether the book is featured (default false)
    pub is_featured: bool,

    /// Number of recorded views
    pub view_count: i64,

    /// Number of recorded downloads
    pub download_count: i64,

    /// Creation timestamp (ms since epoch)
    pub created_at: i64,

    /// Last mutation timestamp (ms since epoch)
    pub updated_at: i64,
}

/// Input for creating a catalog entry.
///
/// Passed to `CatalogStore::create_book()`. The store resolves defaults for
/// the optional fields: language "en", copyright status "unknown",
/// verification date = insert time. The upload path fills in `filename`,
/// `object_key`, and `file_size` after the object is stored.
///
/// # Examples
///
/// ```ignore
/// use bookhouse_catalog::NewBook;
///
/// let book = NewBook {
///     title: "Walden".to_string(),
///     author: Some("Henry David Thoreau".to_string()),
///     copyright_status: Some("Public Domain".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub publication_year: Option<i64>,
    /// Defaults to "en"
    pub language: Option<String>,
    pub tags: Option<Vec<String>>,
    /// Defaults to "unknown"
    pub copyright_status: Option<String>,
    pub license: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub attribution_required: bool,
    pub commercial_use_allowed: bool,
    /// Defaults to the insert timestamp
    pub verification_date: Option<i64>,
    pub legal_notes: Option<String>,
    pub filename: Option<String>,
    pub object_key: Option<String>,
    pub file_size: Option<i64>,
    pub page_count: Option<i64>,
    pub cover_url: Option<String>,
    pub is_public: bool,
    pub is_featured: bool,
}

impl Default for NewBook {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: None,
            description: None,
            genre: None,
            publication_year: None,
            language: None,
            tags: None,
            copyright_status: None,
            license: None,
            source: None,
            source_url: None,
            attribution_required: false,
            commercial_use_allowed: true,
            verification_date: None,
            legal_notes: None,
            filename: None,
            object_key: None,
            file_size: None,
            page_count: None,
            cover_url: None,
            is_public: true,
            is_featured: false,
        }
    }
}

/// Partial metadata update. `None` fields are left unchanged.
///
/// Applying any patch (even an empty one) advances `updated_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookPatch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub copyright_status: Option<String>,
    pub license: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub legal_notes: Option<String>,
    pub attribution_required: Option<bool>,
    pub commercial_use_allowed: Option<bool>,
    pub language: Option<String>,
    pub publication_year: Option<i64>,
    pub genre: Option<String>,
    pub tags: Option<Vec<String>>,
    pub page_count: Option<i64>,
    pub is_public: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Filter predicates for the list query. All present criteria are
/// AND-combined.
///
/// # Fields
///
/// * `search` - Case-insensitive substring match against title, author, OR
///   description
/// * `author` - Case-insensitive substring match against author only
/// * `genre` - Case-insensitive substring match against genre
/// * `language` - Exact match
/// * `copyright_status` - Exact match
/// * `featured_only` - Restrict to featured books
/// * `public_only` - Restrict to public books (default true)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookCriteria {
    pub search: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub copyright_status: Option<String>,
    pub featured_only: bool,
    pub public_only: bool,
}

impl Default for BookCriteria {
    fn default() -> Self {
        Self {
            search: None,
            author: None,
            genre: None,
            language: None,
            copyright_status: None,
            featured_only: false,
            public_only: true,
        }
    }
}

/// Sortable columns. A closed set; anything else falls back to
/// [`Sort::default`] (newest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    Title,
    Author,
    CreatedAt,
    UpdatedAt,
    PublicationYear,
    ViewCount,
    DownloadCount,
    FileSize,
}

impl SortKey {
    /// Column name this key sorts by.
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::CreatedAt => "created_at",
            SortKey::UpdatedAt => "updated_at",
            SortKey::PublicationYear => "publication_year",
            SortKey::ViewCount => "view_count",
            SortKey::DownloadCount => "download_count",
            SortKey::FileSize => "file_size",
        }
    }

    /// Parse a wire-level field name. Returns `None` for unknown fields.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "title" => Some(SortKey::Title),
            "author" => Some(SortKey::Author),
            "created_at" => Some(SortKey::CreatedAt),
            "updated_at" => Some(SortKey::UpdatedAt),
            "publication_year" => Some(SortKey::PublicationYear),
            "view_count" => Some(SortKey::ViewCount),
            "download_count" => Some(SortKey::DownloadCount),
            "file_size" => Some(SortKey::FileSize),
            _ => None,
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// A sort key plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for Sort {
    /// Newest first.
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl Sort {
    /// Parse wire-level sort parameters. An unknown field or direction falls
    /// back to the default rather than erroring.
    pub fn parse(key: &str, order: &str) -> Self {
        match (SortKey::parse(key), SortOrder::parse(order)) {
            (Some(key), Some(order)) => Sort { key, order },
            _ => Sort::default(),
        }
    }
}

/// 1-indexed pagination bounds. Construction clamps the page to >= 1 and the
/// page size to 1..=[`PageRequest::MAX_PER_PAGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    pub const MAX_PER_PAGE: u32 = 100;
    pub const DEFAULT_PER_PAGE: u32 = 20;

    pub fn new(page: u32, per_page: u32) -> Self {
        Self {
            page: page.max(1),
            per_page: per_page.clamp(1, Self::MAX_PER_PAGE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }

    pub fn offset(&self) -> i64 {
        (self.page as i64 - 1) * self.per_page as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: Self::DEFAULT_PER_PAGE,
        }
    }
}

/// Pagination metadata derived from a total count and the requested page.
///
/// A page beyond the last yields empty items with `has_next = false`; it is
/// not an error.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: i64,
    pub items_per_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn new(page: PageRequest, total_items: i64) -> Self {
        let per = page.per_page() as i64;
        let total_pages = if total_items <= 0 {
            0
        } else {
            (total_items + per - 1) / per
        };
        Self {
            current_page: page.page(),
            total_pages: total_pages as u32,
            total_items,
            items_per_page: page.per_page(),
            has_next: (page.page() as i64) < total_pages,
            has_previous: page.page() > 1,
        }
    }
}

/// One page of list results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub pagination: Pagination,
}

/// Autocomplete buckets: up to 5 distinct titles and 5 distinct non-empty
/// authors, public books only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Suggestions {
    pub titles: Vec<String>,
    pub authors: Vec<String>,
}

/// One grouped-count entry of an aggregation dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FacetCount {
    pub value: String,
    pub count: i64,
}

/// Collection statistics snapshot.
///
/// Grouped dimensions cover public books only; `total_books`,
/// `featured_books`, and `recent_uploads` count over all rows. Ties at a
/// top-N boundary resolve in store natural order; there is no tie-break key.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_books: i64,
    pub public_books: i64,
    pub featured_books: i64,
    /// Books created within the last 7 days (fixed window)
    pub recent_uploads: i64,
    /// Counts per copyright status, descending
    pub copyright_distribution: Vec<FacetCount>,
    /// Top 10 languages by count, descending
    pub language_distribution: Vec<FacetCount>,
    /// Top 10 authors by count, descending; NULL/empty authors excluded
    pub top_authors: Vec<FacetCount>,
}

/// An upstream content provider. Read-only from the service.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContentSource {
    pub id: i64,
    pub name: String,
    pub base_url: Option<String>,
    pub api_endpoint: Option<String>,
    pub is_trusted: bool,
    pub default_license: Option<String>,
    pub requires_attribution: bool,
    pub notes: Option<String>,
    pub created_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_clamps_bounds() {
        let page = PageRequest::new(0, 0);
        assert_eq!(page.page(), 1);
        assert_eq!(page.per_page(), 1);

        let page = PageRequest::new(3, 500);
        assert_eq!(page.page(), 3);
        assert_eq!(page.per_page(), PageRequest::MAX_PER_PAGE);
    }

    #[test]
    fn page_request_offset() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn pagination_math() {
        let p = Pagination::new(PageRequest::new(1, 10), 25);
        assert_eq!(p.total_pages, 3);
        assert!(p.has_next);
        assert!(!p.has_previous);

        let p = Pagination::new(PageRequest::new(3, 10), 25);
        assert!(!p.has_next);
        assert!(p.has_previous);

        let p = Pagination::new(PageRequest::new(1, 10), 0);
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
    }

    #[test]
    fn sort_parse_falls_back_on_unknown_input() {
        assert_eq!(
            Sort::parse("title", "asc"),
            Sort {
                key: SortKey::Title,
                order: SortOrder::Asc
            }
        );
        assert_eq!(Sort::parse("relevance", "asc"), Sort::default());
        assert_eq!(Sort::parse("title", "sideways"), Sort::default());
    }
}
