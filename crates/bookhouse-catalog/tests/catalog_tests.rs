//! Integration tests for the catalog store
//!
//! These tests exercise the public CatalogStore API end to end: browsing,
//! filtering, pagination, aggregation, counters, and the degraded behavior
//! against reduced legacy schemas.

use std::sync::Arc;

use bookhouse_catalog::{
    BookCriteria, BookPatch, CatalogStore, NewBook, PageRequest, Sort, SqliteCatalogStore,
};
use sqlx::sqlite::SqlitePoolOptions;

/// Helper to build a public book with the given title
fn public_book(title: &str, author: &str) -> NewBook {
    NewBook {
        title: title.to_string(),
        author: Some(author.to_string()),
        ..Default::default()
    }
}

async fn test_store() -> SqliteCatalogStore {
    SqliteCatalogStore::new_in_memory().await.unwrap()
}

// ============================================================================
// Workflow
// ============================================================================

#[tokio::test]
async fn test_full_catalog_workflow() {
    let store = test_store().await;

    // 1. Register a book
    let book = store
        .create_book(NewBook {
            title: "Walden".to_string(),
            author: Some("Henry David Thoreau".to_string()),
            genre: Some("Philosophy".to_string()),
            copyright_status: Some("Public Domain".to_string()),
            publication_year: Some(1854),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(book.id > 0);
    assert_eq!(book.language, "en");

    // 2. It shows up in the default listing
    let page = store
        .list_books(&BookCriteria::default(), Sort::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.pagination.total_items, 1);
    assert_eq!(page.books[0].title, "Walden");

    // 3. Patch metadata
    let updated = store
        .update_book(
            book.id,
            BookPatch {
                description: Some("Life in the woods.".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.description.as_deref(), Some("Life in the woods."));
    assert!(updated.updated_at > book.updated_at);

    // 4. Engagement counters
    assert_eq!(store.record_view(book.id).await.unwrap(), 1);
    assert_eq!(store.record_download(book.id).await.unwrap(), 1);
    assert_eq!(store.record_view(book.id).await.unwrap(), 2);

    // 5. Curation flags
    let featured = store.set_featured(book.id, true).await.unwrap();
    assert!(featured.is_featured);
    assert_eq!(store.featured_books(10).await.unwrap().len(), 1);

    // 6. Delete
    store.delete_book(book.id).await.unwrap();
    assert!(store.get_book(book.id).await.unwrap().is_none());
}

// ============================================================================
// Filtering and search
// ============================================================================

#[tokio::test]
async fn test_search_and_filters() {
    let store = test_store().await;

    store
        .create_book(public_book("Walden", "Henry David Thoreau"))
        .await
        .unwrap();
    store
        .create_book(NewBook {
            description: Some("Return to Walden pond".to_string()),
            language: Some("de".to_string()),
            ..public_book("Second Visit", "B. F. Skinner")
        })
        .await
        .unwrap();
    store
        .create_book(NewBook {
            is_public: false,
            ..public_book("Hidden Walden", "Anonymous")
        })
        .await
        .unwrap();
    store
        .create_book(public_book("Moby Dick", "Herman Melville"))
        .await
        .unwrap();

    // Substring search is case-insensitive and matches title OR description.
    // The hidden book stays out of public listings.
    let criteria = BookCriteria {
        search: Some("WALDEN".to_string()),
        ..Default::default()
    };
    let page = store
        .list_books(&criteria, Sort::default(), PageRequest::default())
        .await
        .unwrap();
    let titles: Vec<&str> = page.books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(page.pagination.total_items, 2);
    assert!(titles.contains(&"Walden"));
    assert!(titles.contains(&"Second Visit"));

    // Hidden books are reachable when the public restriction is lifted
    let criteria = BookCriteria {
        search: Some("walden".to_string()),
        public_only: false,
        ..Default::default()
    };
    let page = store
        .list_books(&criteria, Sort::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.pagination.total_items, 3);

    // Author substring filter
    let criteria = BookCriteria {
        author: Some("melville".to_string()),
        ..Default::default()
    };
    let page = store
        .list_books(&criteria, Sort::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.pagination.total_items, 1);
    assert_eq!(page.books[0].title, "Moby Dick");

    // Exact language filter
    let criteria = BookCriteria {
        language: Some("de".to_string()),
        ..Default::default()
    };
    let page = store
        .list_books(&criteria, Sort::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.pagination.total_items, 1);
    assert_eq!(page.books[0].title, "Second Visit");

    // Filters AND-combine: search + language excludes the German book
    let criteria = BookCriteria {
        search: Some("walden".to_string()),
        language: Some("en".to_string()),
        ..Default::default()
    };
    let page = store
        .list_books(&criteria, Sort::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.pagination.total_items, 1);
    assert_eq!(page.books[0].title, "Walden");
}

#[tokio::test]
async fn test_pagination_properties() {
    let store = test_store().await;

    for i in 0..25 {
        store
            .create_book(public_book(&format!("Book {:02}", i), "Author"))
            .await
            .unwrap();
    }

    let criteria = BookCriteria::default();
    let sort = Sort::parse("title", "asc");

    let first = store
        .list_books(&criteria, sort, PageRequest::new(1, 10))
        .await
        .unwrap();
    assert_eq!(first.books.len(), 10);
    assert_eq!(first.pagination.total_items, 25);
    assert_eq!(first.pagination.total_pages, 3);
    assert!(first.pagination.has_next);
    assert!(!first.pagination.has_previous);
    assert_eq!(first.books[0].title, "Book 00");

    let last = store
        .list_books(&criteria, sort, PageRequest::new(3, 10))
        .await
        .unwrap();
    assert_eq!(last.books.len(), 5);
    assert!(!last.pagination.has_next);
    assert!(last.pagination.has_previous);
    assert_eq!(last.books[4].title, "Book 24");

    // Pages never overlap
    let second = store
        .list_books(&criteria, sort, PageRequest::new(2, 10))
        .await
        .unwrap();
    assert_eq!(second.books[0].title, "Book 10");
    assert!(first.books.iter().all(|b| !second.books.contains(b)));

    // Beyond the last page: empty rows, same totals
    let beyond = store
        .list_books(&criteria, sort, PageRequest::new(9, 10))
        .await
        .unwrap();
    assert!(beyond.books.is_empty());
    assert_eq!(beyond.pagination.total_items, 25);
    assert_eq!(beyond.pagination.total_pages, 3);
}

#[tokio::test]
async fn test_sort_orders() {
    let store = test_store().await;

    let a = store
        .create_book(NewBook {
            publication_year: Some(1851),
            ..public_book("Moby Dick", "Herman Melville")
        })
        .await
        .unwrap();
    let b = store
        .create_book(NewBook {
            publication_year: Some(1854),
            ..public_book("Walden", "Henry David Thoreau")
        })
        .await
        .unwrap();
    store.record_view(a.id).await.unwrap();
    store.record_view(a.id).await.unwrap();
    store.record_view(b.id).await.unwrap();

    let criteria = BookCriteria::default();

    let by_title = store
        .list_books(&criteria, Sort::parse("title", "asc"), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(by_title.books[0].title, "Moby Dick");

    let by_year = store
        .list_books(
            &criteria,
            Sort::parse("publication_year", "desc"),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_year.books[0].title, "Walden");

    let by_views = store
        .list_books(
            &criteria,
            Sort::parse("view_count", "desc"),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(by_views.books[0].title, "Moby Dick");

    // Unknown sort fields fall back to newest first instead of erroring
    let fallback = store
        .list_books(
            &criteria,
            Sort::parse("deleted_at", "desc"),
            PageRequest::default(),
        )
        .await
        .unwrap();
    assert_eq!(fallback.books.len(), 2);
    let stamps: Vec<i64> = fallback.books.iter().map(|b| b.created_at).collect();
    assert!(stamps.windows(2).all(|w| w[0] >= w[1]));
}

// ============================================================================
// Browsing surfaces
// ============================================================================

#[tokio::test]
async fn test_public_catalog() {
    let store = test_store().await;

    // Curated seed content is in even when hidden
    store
        .create_book(NewBook {
            source: Some("Sample Data".to_string()),
            is_public: false,
            ..public_book("Aesop's Fables", "Aesop")
        })
        .await
        .unwrap();
    // Public-domain content is in
    store
        .create_book(NewBook {
            copyright_status: Some("Public Domain".to_string()),
            ..public_book("Walden", "Henry David Thoreau")
        })
        .await
        .unwrap();
    // A public user upload without public-domain status stays out
    store
        .create_book(NewBook {
            source: Some("User Upload".to_string()),
            ..public_book("My Notes", "Somebody")
        })
        .await
        .unwrap();
    // Featured entries sort before the rest
    store
        .create_book(NewBook {
            source: Some("Internet Archive".to_string()),
            is_featured: true,
            ..public_book("Zarathustra", "Friedrich Nietzsche")
        })
        .await
        .unwrap();
    // Public but unlabeled provenance: not part of the curated catalog
    store
        .create_book(public_book("Loose Papers", "Unknown"))
        .await
        .unwrap();

    let books = store.public_books(None, 50).await.unwrap();
    let titles: Vec<&str> = books.iter().map(|b| b.title.as_str()).collect();
    assert_eq!(titles, vec!["Zarathustra", "Aesop's Fables", "Walden"]);

    // "all" is a wildcard, not a genre
    let all = store.public_books(Some("all"), 50).await.unwrap();
    assert_eq!(all.len(), 3);
}

#[tokio::test]
async fn test_public_catalog_genre_filter() {
    let store = test_store().await;

    store
        .create_book(NewBook {
            genre: Some("Philosophy".to_string()),
            copyright_status: Some("Public Domain".to_string()),
            ..public_book("Walden", "Henry David Thoreau")
        })
        .await
        .unwrap();
    store
        .create_book(NewBook {
            genre: Some("Adventure Fiction".to_string()),
            copyright_status: Some("Public Domain".to_string()),
            ..public_book("Moby Dick", "Herman Melville")
        })
        .await
        .unwrap();

    let fiction = store.public_books(Some("fiction"), 50).await.unwrap();
    assert_eq!(fiction.len(), 1);
    assert_eq!(fiction[0].title, "Moby Dick");

    let empty_genre = store.public_books(Some(""), 50).await.unwrap();
    assert_eq!(empty_genre.len(), 2);
}

#[tokio::test]
async fn test_user_uploads() {
    let store = test_store().await;

    // Uploaded by a user
    store
        .create_book(NewBook {
            source: Some("User Upload".to_string()),
            filename: Some("notes.pdf".to_string()),
            object_key: Some("books/abc_notes.pdf".to_string()),
            ..public_book("My Notes", "Somebody")
        })
        .await
        .unwrap();
    // Seed content with a file attached is not a user upload
    store
        .create_book(NewBook {
            source: Some("Sample Data".to_string()),
            filename: Some("walden.pdf".to_string()),
            object_key: Some("books/def_walden.pdf".to_string()),
            ..public_book("Walden", "Henry David Thoreau")
        })
        .await
        .unwrap();
    // Metadata-only rows have no content to show
    store
        .create_book(public_book("Moby Dick", "Herman Melville"))
        .await
        .unwrap();

    let uploads = store.user_uploads(50).await.unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].title, "My Notes");
}

#[tokio::test]
async fn test_search_suggestions() {
    let store = test_store().await;

    store
        .create_book(public_book("Abstract Algebra", "Saunders Mac Lane"))
        .await
        .unwrap();
    store
        .create_book(public_book("Cabinet of Curiosities", "Charles Babbage"))
        .await
        .unwrap();
    store
        .create_book(NewBook {
            is_public: false,
            ..public_book("Abandoned Places", "Nobody")
        })
        .await
        .unwrap();

    let suggestions = store.search_suggestions("ab").await.unwrap();
    assert!(suggestions.titles.contains(&"Abstract Algebra".to_string()));
    assert!(suggestions
        .titles
        .contains(&"Cabinet of Curiosities".to_string()));
    // Hidden books never surface in autocomplete
    assert!(!suggestions.titles.contains(&"Abandoned Places".to_string()));
    assert!(suggestions.authors.contains(&"Charles Babbage".to_string()));

    // Too-short queries return empty buckets instead of scanning everything
    let short = store.search_suggestions("a").await.unwrap();
    assert!(short.titles.is_empty());
    assert!(short.authors.is_empty());
}

#[tokio::test]
async fn test_search_suggestions_cap() {
    let store = test_store().await;

    for i in 0..7 {
        store
            .create_book(public_book(&format!("Fable {}", i), "Aesop"))
            .await
            .unwrap();
    }

    let suggestions = store.search_suggestions("fable").await.unwrap();
    assert_eq!(suggestions.titles.len(), 5);
    // The author bucket matches author names, not titles
    assert!(suggestions.authors.is_empty());

    // Seven matching rows collapse to one distinct author
    let suggestions = store.search_suggestions("aesop").await.unwrap();
    assert!(suggestions.titles.is_empty());
    assert_eq!(suggestions.authors, vec!["Aesop".to_string()]);
}

// ============================================================================
// Aggregation
// ============================================================================

#[tokio::test]
async fn test_stats_snapshot() {
    let store = test_store().await;

    store
        .create_book(NewBook {
            copyright_status: Some("Public Domain".to_string()),
            ..public_book("Walden", "Henry David Thoreau")
        })
        .await
        .unwrap();
    store
        .create_book(NewBook {
            copyright_status: Some("Public Domain".to_string()),
            is_featured: true,
            ..public_book("Moby Dick", "Herman Melville")
        })
        .await
        .unwrap();
    store
        .create_book(NewBook {
            language: Some("de".to_string()),
            ..public_book("Faust", "Johann Wolfgang von Goethe")
        })
        .await
        .unwrap();
    // Hidden and featured: counted in the totals but not the public slices
    store
        .create_book(NewBook {
            is_public: false,
            is_featured: true,
            ..public_book("Secret Walden", "Henry David Thoreau")
        })
        .await
        .unwrap();

    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_books, 4);
    assert_eq!(stats.public_books, 3);
    // The featured count spans all rows, hidden included
    assert_eq!(stats.featured_books, 2);
    // Everything was created just now
    assert_eq!(stats.recent_uploads, 4);

    let pd = stats
        .copyright_distribution
        .iter()
        .find(|f| f.value == "Public Domain")
        .unwrap();
    assert_eq!(pd.count, 2);

    let en = stats
        .language_distribution
        .iter()
        .find(|f| f.value == "en")
        .unwrap();
    assert_eq!(en.count, 2);

    // Distributions are public-scoped, so the hidden Thoreau doesn't count
    let thoreau = stats
        .top_authors
        .iter()
        .find(|f| f.value == "Henry David Thoreau")
        .unwrap();
    assert_eq!(thoreau.count, 1);

    // Descending counts
    let counts: Vec<i64> = stats.language_distribution.iter().map(|f| f.count).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
}

// ============================================================================
// Degraded schemas
// ============================================================================

/// Reads keep working against a database that predates the visibility,
/// curation, and provenance columns.
#[tokio::test]
async fn test_degraded_schema_reads() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE books (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            author TEXT,
            view_count INTEGER NOT NULL DEFAULT 0,
            download_count INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO books (title, author, created_at, updated_at) VALUES ('Walden', 'Henry David Thoreau', 1, 1), ('Moby Dick', 'Herman Melville', 2, 2)")
        .execute(&pool)
        .await
        .unwrap();

    let store = SqliteCatalogStore::from_pool(pool).await.unwrap();
    assert!(!store.capabilities().is_complete());
    assert!(store.capabilities().missing_columns().contains(&"is_public"));

    // Rows read back with catalog defaults for the missing columns
    let book = store.get_book(1).await.unwrap().unwrap();
    assert_eq!(book.title, "Walden");
    assert_eq!(book.language, "en");
    assert!(book.is_public);
    assert!(!book.is_featured);

    // Without visibility columns every row counts as public
    let page = store
        .list_books(&BookCriteria::default(), Sort::default(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.pagination.total_items, 2);

    // No featured flag and no seed label: featured browsing is empty, not
    // an error
    assert!(store.featured_books(10).await.unwrap().is_empty());

    // The genre filter has nothing to match against and is dropped
    let books = store.public_books(Some("fiction"), 50).await.unwrap();
    assert_eq!(books.len(), 2);
    assert_eq!(books[0].title, "Moby Dick");

    // No filename column means nothing qualifies as an upload
    assert!(store.user_uploads(10).await.unwrap().is_empty());

    // Aggregation degrades per dimension
    let stats = store.stats().await.unwrap();
    assert_eq!(stats.total_books, 2);
    assert_eq!(stats.featured_books, 0);
    assert!(stats.language_distribution.is_empty());
    assert_eq!(stats.top_authors.len(), 2);

    // Counters still work; those columns exist
    assert_eq!(store.record_view(1).await.unwrap(), 1);
}

// ============================================================================
// Concurrency
// ============================================================================

/// Counter bumps are atomic: concurrent writers never lose an increment.
#[tokio::test]
async fn test_concurrent_counter_increments() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.db");
    let store = Arc::new(SqliteCatalogStore::new(&path).await.unwrap());

    let book = store
        .create_book(public_book("Walden", "Henry David Thoreau"))
        .await
        .unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let store = store.clone();
        let id = book.id;
        handles.push(tokio::spawn(async move {
            for _ in 0..5 {
                store.record_view(id).await.unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let after = store.get_book(book.id).await.unwrap().unwrap();
    assert_eq!(after.view_count, 100);
}

/// updated_at strictly increases across rapid successive mutations, even
/// when several land within one millisecond.
#[tokio::test]
async fn test_updated_at_monotonic() {
    let store = test_store().await;
    let book = store
        .create_book(public_book("Walden", "Henry David Thoreau"))
        .await
        .unwrap();

    let mut last = book.updated_at;
    for i in 0..5 {
        let updated = store
            .update_book(
                book.id,
                BookPatch {
                    description: Some(format!("revision {}", i)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.updated_at > last);
        last = updated.updated_at;
    }

    store.record_view(book.id).await.unwrap();
    let after = store.get_book(book.id).await.unwrap().unwrap();
    assert!(after.updated_at > last);
}
