//! API models for REST endpoints

use bookhouse_catalog::{
    Book, BookPage, BookPatch, CatalogStats, ContentSource, Pagination, Suggestions,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub(crate) fn format_timestamp(timestamp_millis: i64) -> String {
    let timestamp_secs = timestamp_millis / 1000;
    let nanos = ((timestamp_millis % 1000) * 1_000_000) as u32;

    DateTime::from_timestamp(timestamp_secs, nanos)
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}

/// A catalog book as served to clients.
///
/// The storage key is not exposed; content is reached through the download
/// endpoint. Timestamps are RFC 3339 strings.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: Option<String>,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub publication_year: Option<i64>,
    pub language: String,
    pub tags: Vec<String>,
    pub copyright_status: String,
    pub license: Option<String>,
    pub source: Option<String>,
    pub source_url: Option<String>,
    pub attribution_required: bool,
    pub commercial_use_allowed: bool,
    pub verification_date: Option<String>,
    pub legal_notes: Option<String>,
    pub filename: Option<String>,
    pub file_size: Option<i64>,
    pub page_count: Option<i64>,
    pub cover_url: Option<String>,
    pub is_public: bool,
    pub is_featured: bool,
    pub view_count: i64,
    pub download_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
            author: book.author,
            description: book.description,
            genre: book.genre,
            publication_year: book.publication_year,
            language: book.language,
            tags: book.tags.unwrap_or_default(),
            copyright_status: book.copyright_status,
            license: book.license,
            source: book.source,
            source_url: book.source_url,
            attribution_required: book.attribution_required,
            commercial_use_allowed: book.commercial_use_allowed,
            verification_date: book.verification_date.map(format_timestamp),
            legal_notes: book.legal_notes,
            filename: book.filename,
            file_size: book.file_size,
            page_count: book.page_count,
            cover_url: book.cover_url,
            is_public: book.is_public,
            is_featured: book.is_featured,
            view_count: book.view_count,
            download_count: book.download_count,
            created_at: format_timestamp(book.created_at),
            updated_at: format_timestamp(book.updated_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: i64,
    pub items_per_page: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl From<Pagination> for PaginationMeta {
    fn from(p: Pagination) -> Self {
        Self {
            current_page: p.current_page,
            total_pages: p.total_pages,
            total_items: p.total_items,
            items_per_page: p.items_per_page,
            has_next: p.has_next,
            has_previous: p.has_previous,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaginatedBooksResponse {
    pub books: Vec<BookResponse>,
    pub pagination: PaginationMeta,
}

impl From<BookPage> for PaginatedBooksResponse {
    fn from(page: BookPage) -> Self {
        Self {
            books: page.books.into_iter().map(BookResponse::from).collect(),
            pagination: page.pagination.into(),
        }
    }
}

/// Query parameters for the main listing endpoint.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ListBooksParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub language: Option<String>,
    pub copyright_status: Option<String>,
    #[serde(default)]
    pub featured_only: bool,
    #[serde(default = "default_public_only")]
    pub public_only: bool,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

fn default_public_only() -> bool {
    true
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LimitParam {
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PublicCatalogParams {
    pub genre: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SuggestParams {
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DownloadParams {
    /// Serve PDFs in the browser instead of returning a download link
    #[serde(default)]
    pub inline: bool,
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateBookRequest {
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

impl From<UpdateBookRequest> for BookPatch {
    fn from(req: UpdateBookRequest) -> Self {
        BookPatch {
            title: req.title,
            author: req.author,
            description: req.description,
            cover_url: req.cover_url,
            copyright_status: req.copyright_status,
            license: req.license,
            source: req.source,
            source_url: req.source_url,
            legal_notes: req.legal_notes,
            attribution_required: req.attribution_required,
            commercial_use_allowed: req.commercial_use_allowed,
            language: req.language,
            publication_year: req.publication_year,
            genre: req.genre,
            tags: req.tags,
            page_count: req.page_count,
            is_public: req.is_public,
            is_featured: req.is_featured,
        }
    }
}

/// Query parameter for the featured toggle.
#[derive(Debug, Deserialize)]
pub struct FeatureParams {
    pub featured: bool,
}

/// Query parameter for the visibility toggle.
#[derive(Debug, Deserialize)]
pub struct VisibilityParams {
    pub is_public: bool,
}

/// Plain acknowledgement for admin toggles.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadLinkResponse {
    /// Time-limited signed URL
    pub url: String,
    /// Uppercased file format, e.g. "PDF"
    pub format: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ViewRecordedResponse {
    pub message: String,
    pub total_views: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DownloadRecordedResponse {
    pub message: String,
    pub total_downloads: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub message: String,
    pub deleted_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SuggestionsResponse {
    pub titles: Vec<String>,
    pub authors: Vec<String>,
}

impl From<Suggestions> for SuggestionsResponse {
    fn from(s: Suggestions) -> Self {
        Self {
            titles: s.titles,
            authors: s.authors,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CopyrightCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LanguageCount {
    pub language: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthorCount {
    pub name: String,
    pub book_count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_books: i64,
    pub public_books: i64,
    pub featured_books: i64,
    pub recent_uploads_7days: i64,
    pub copyright_distribution: Vec<CopyrightCount>,
    pub language_distribution: Vec<LanguageCount>,
    pub top_authors: Vec<AuthorCount>,
}

impl From<CatalogStats> for StatsResponse {
    fn from(stats: CatalogStats) -> Self {
        Self {
            total_books: stats.total_books,
            public_books: stats.public_books,
            featured_books: stats.featured_books,
            recent_uploads_7days: stats.recent_uploads,
            copyright_distribution: stats
                .copyright_distribution
                .into_iter()
                .map(|f| CopyrightCount {
                    status: f.value,
                    count: f.count,
                })
                .collect(),
            language_distribution: stats
                .language_distribution
                .into_iter()
                .map(|f| LanguageCount {
                    language: f.value,
                    count: f.count,
                })
                .collect(),
            top_authors: stats
                .top_authors
                .into_iter()
                .map(|f| AuthorCount {
                    name: f.value,
                    book_count: f.count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SourceResponse {
    pub id: i64,
    pub name: String,
    pub base_url: Option<String>,
    pub api_endpoint: Option<String>,
    pub is_trusted: bool,
    pub default_license: Option<String>,
    pub requires_attribution: bool,
    pub notes: Option<String>,
    pub created_at: String,
}

impl From<ContentSource> for SourceResponse {
    fn from(s: ContentSource) -> Self {
        Self {
            id: s.id,
            name: s.name,
            base_url: s.base_url,
            api_endpoint: s.api_endpoint,
            is_trusted: s.is_trusted,
            default_license: s.default_license,
            requires_attribution: s.requires_attribution,
            notes: s.notes,
            created_at: format_timestamp(s.created_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_timestamp_is_rfc3339() {
        let formatted = format_timestamp(1_700_000_000_000);
        assert!(formatted.starts_with("2023-11-14T"));
        assert!(formatted.ends_with("+00:00"));
    }

    #[test]
    fn book_response_hides_storage_key() {
        let raw = serde_json::to_value(BookResponse::from(sample_book())).unwrap();
        assert!(raw.get("object_key").is_none());
        assert_eq!(raw["title"], "Walden");
        assert_eq!(raw["tags"], serde_json::json!(["nature", "philosophy"]));
    }

    #[test]
    fn stats_response_renames_dimensions() {
        let stats = CatalogStats {
            total_books: 4,
            public_books: 3,
            featured_books: 2,
            recent_uploads: 1,
            copyright_distribution: vec![bookhouse_catalog::FacetCount {
                value: "Public Domain".to_string(),
                count: 3,
            }],
            language_distribution: vec![],
            top_authors: vec![bookhouse_catalog::FacetCount {
                value: "Thoreau".to_string(),
                count: 2,
            }],
        };

        let resp = StatsResponse::from(stats);
        assert_eq!(resp.recent_uploads_7days, 1);
        assert_eq!(resp.copyright_distribution[0].status, "Public Domain");
        assert_eq!(resp.top_authors[0].name, "Thoreau");
        assert_eq!(resp.top_authors[0].book_count, 2);
    }

    fn sample_book() -> Book {
        Book {
            id: 1,
            title: "Walden".to_string(),
            author: Some("Henry David Thoreau".to_string()),
            description: None,
            genre: Some("Philosophy".to_string()),
            publication_year: Some(1854),
            language: "en".to_string(),
            tags: Some(vec!["nature".to_string(), "philosophy".to_string()]),
            copyright_status: "Public Domain".to_string(),
            license: None,
            source: Some("Project Gutenberg".to_string()),
            source_url: None,
            attribution_required: false,
            commercial_use_allowed: true,
            verification_date: Some(1_700_000_000_000),
            legal_notes: None,
            filename: Some("walden.pdf".to_string()),
            object_key: Some("books/abc_Walden.pdf".to_string()),
            file_size: Some(1024),
            page_count: None,
            cover_url: None,
            is_public: true,
            is_featured: false,
            view_count: 7,
            download_count: 3,
            created_at: 1_700_000_000_000,
            updated_at: 1_700_000_000_001,
        }
    }
}
