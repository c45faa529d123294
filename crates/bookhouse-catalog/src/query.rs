//! Filter / Sort / Paginate Engine
//!
//! Composes dynamic WHERE, ORDER BY, and LIMIT/OFFSET clauses from typed
//! criteria using `sqlx::QueryBuilder`. The same predicate builders feed
//! both the COUNT query and the page query so totals always agree with the
//! returned rows.
//!
//! Every predicate consults [`SchemaCapabilities`] and degrades per the
//! fixed fallback chains instead of erroring on a reduced schema: an
//! unavailable filter column either narrows to a substitute column or drops
//! the predicate, and an unavailable sort column falls back to newest-first.
//!
//! Sort columns come from the closed [`SortKey`] enum and are pushed as
//! literals; user input never reaches the SQL text.

use sqlx::{QueryBuilder, Sqlite};

use crate::capabilities::{SchemaCapabilities, PUBLIC_DOMAIN_STATUS, SEED_SOURCE, USER_UPLOAD_SOURCE};
use crate::types::{BookCriteria, Sort};

/// Canonical column order of the books table. Reads select exactly these,
/// with `NULL AS col` standing in for columns the live schema lacks, so row
/// decoding stays uniform across schema generations.
pub(crate) const BOOK_COLUMNS: &[&str] = &[
    "id",
    "title",
    "author",
    "description",
    "genre",
    "publication_year",
    "language",
    "tags",
    "copyright_status",
    "license",
    "source",
    "source_url",
    "attribution_required",
    "commercial_use_allowed",
    "verification_date",
    "legal_notes",
    "filename",
    "object_key",
    "file_size",
    "page_count",
    "cover_url",
    "is_public",
    "is_featured",
    "view_count",
    "download_count",
    "created_at",
    "updated_at",
];

/// Build the SELECT column list for the live schema.
pub(crate) fn select_columns(caps: &SchemaCapabilities) -> String {
    BOOK_COLUMNS
        .iter()
        .map(|c| {
            if caps.has(c) {
                (*c).to_string()
            } else {
                format!("NULL AS {}", c)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Push ` WHERE ` before the first predicate and ` AND ` before the rest.
pub(crate) fn push_and(qb: &mut QueryBuilder<'_, Sqlite>, has_where: &mut bool) {
    if *has_where {
        qb.push(" AND ");
    } else {
        qb.push(" WHERE ");
        *has_where = true;
    }
}

/// Restrict to publicly visible rows.
///
/// Fallback chain: `is_public` flag -> seed-source label -> no predicate
/// (all rows treated as public).
pub(crate) fn push_public(
    qb: &mut QueryBuilder<'_, Sqlite>,
    has_where: &mut bool,
    caps: &SchemaCapabilities,
) {
    if caps.has("is_public") {
        push_and(qb, has_where);
        qb.push("is_public = 1");
    } else if caps.has("source") {
        tracing::debug!("is_public unavailable; narrowing public filter to seed source");
        push_and(qb, has_where);
        qb.push("source = ").push_bind(SEED_SOURCE);
    } else {
        tracing::debug!("no visibility columns; treating all rows as public");
    }
}

/// Restrict to featured rows.
///
/// Fallback chain: `is_featured` flag -> seed-source label -> unsatisfiable
/// predicate (an empty result, never an error).
pub(crate) fn push_featured(
    qb: &mut QueryBuilder<'_, Sqlite>,
    has_where: &mut bool,
    caps: &SchemaCapabilities,
) {
    push_and(qb, has_where);
    if caps.has("is_featured") {
        qb.push("is_featured = 1");
    } else if caps.has("source") {
        tracing::debug!("is_featured unavailable; narrowing featured filter to seed source");
        qb.push("source = ").push_bind(SEED_SOURCE);
    } else {
        tracing::debug!("no featured columns; featured filter matches nothing");
        qb.push("1 = 0");
    }
}

/// The curated public-catalog predicate: seed content, public-domain
/// content, or explicitly public rows that are not user uploads. Composes
/// whichever parts the schema supports; with none available, every row
/// qualifies.
pub(crate) fn push_public_catalog(
    qb: &mut QueryBuilder<'_, Sqlite>,
    has_where: &mut bool,
    caps: &SchemaCapabilities,
) {
    let has_source = caps.has("source");
    let has_status = caps.has("copyright_status");
    let has_flag = caps.has("is_public");

    if !has_source && !has_status && !has_flag {
        tracing::debug!("no provenance columns; public catalog includes all rows");
        return;
    }

    push_and(qb, has_where);
    qb.push("(");
    let mut any = false;
    if has_source {
        qb.push("source = ").push_bind(SEED_SOURCE);
        any = true;
    }
    if has_status {
        if any {
            qb.push(" OR ");
        }
        qb.push("copyright_status = ").push_bind(PUBLIC_DOMAIN_STATUS);
        any = true;
    }
    if has_flag {
        if any {
            qb.push(" OR ");
        }
        qb.push("(is_public = 1");
        if has_source {
            qb.push(" AND source <> ").push_bind(USER_UPLOAD_SOURCE);
        }
        qb.push(")");
    }
    qb.push(")");
}

/// Substring genre filter.
///
/// Fallback chain: `genre` column -> description substring -> dropped.
pub(crate) fn push_genre(
    qb: &mut QueryBuilder<'_, Sqlite>,
    has_where: &mut bool,
    genre: &str,
    caps: &SchemaCapabilities,
) {
    let pattern = format!("%{}%", genre);
    if caps.has("genre") {
        push_and(qb, has_where);
        qb.push("genre LIKE ").push_bind(pattern);
    } else if caps.has("description") {
        tracing::debug!("genre unavailable; matching description instead");
        push_and(qb, has_where);
        qb.push("description LIKE ").push_bind(pattern);
    } else {
        tracing::debug!("genre filter dropped; no matching columns");
    }
}

/// Push all list-query predicates, AND-combined.
pub(crate) fn push_criteria(
    qb: &mut QueryBuilder<'_, Sqlite>,
    has_where: &mut bool,
    criteria: &BookCriteria,
    caps: &SchemaCapabilities,
) {
    if criteria.public_only {
        push_public(qb, has_where, caps);
    }

    if let Some(search) = criteria.search.as_deref().filter(|s| !s.is_empty()) {
        let columns: Vec<&str> = ["title", "author", "description"]
            .into_iter()
            .filter(|c| caps.has(c))
            .collect();
        if columns.is_empty() {
            tracing::debug!("search filter dropped; no searchable columns");
        } else {
            let pattern = format!("%{}%", search);
            push_and(qb, has_where);
            qb.push("(");
            for (i, column) in columns.iter().enumerate() {
                if i > 0 {
                    qb.push(" OR ");
                }
                qb.push(*column).push(" LIKE ").push_bind(pattern.clone());
            }
            qb.push(")");
        }
    }

    if let Some(author) = criteria.author.as_deref().filter(|s| !s.is_empty()) {
        if caps.has("author") {
            push_and(qb, has_where);
            qb.push("author LIKE ").push_bind(format!("%{}%", author));
        } else {
            tracing::debug!("author filter dropped; column unavailable");
        }
    }

    if let Some(language) = criteria.language.as_deref().filter(|s| !s.is_empty()) {
        if caps.has("language") {
            push_and(qb, has_where);
            qb.push("language = ").push_bind(language.to_string());
        } else {
            tracing::debug!("language filter dropped; column unavailable");
        }
    }

    if let Some(genre) = criteria.genre.as_deref().filter(|s| !s.is_empty()) {
        push_genre(qb, has_where, genre, caps);
    }

    if let Some(status) = criteria.copyright_status.as_deref().filter(|s| !s.is_empty()) {
        if caps.has("copyright_status") {
            push_and(qb, has_where);
            qb.push("copyright_status = ").push_bind(status.to_string());
        } else {
            tracing::debug!("copyright_status filter dropped; column unavailable");
        }
    }

    if criteria.featured_only {
        push_featured(qb, has_where, caps);
    }
}

/// Push the ORDER BY clause for `sort`, falling back to newest-first when
/// the requested column is unavailable.
pub(crate) fn push_order(qb: &mut QueryBuilder<'_, Sqlite>, sort: Sort, caps: &SchemaCapabilities) {
    let column = sort.key.column();
    if caps.has(column) {
        qb.push(" ORDER BY ")
            .push(column)
            .push(" ")
            .push(sort.order.sql());
    } else if caps.has("created_at") {
        tracing::debug!(column, "sort column unavailable; falling back to created_at DESC");
        qb.push(" ORDER BY created_at DESC");
    } else {
        qb.push(" ORDER BY id DESC");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn caps_for(schema: &str) -> SchemaCapabilities {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(schema).execute(&pool).await.unwrap();
        SchemaCapabilities::probe(&pool).await.unwrap()
    }

    #[tokio::test]
    async fn select_columns_backfills_missing_columns_with_null() {
        let caps = caps_for(
            "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT NOT NULL,
             created_at INTEGER NOT NULL, updated_at INTEGER NOT NULL)",
        )
        .await;

        let columns = select_columns(&caps);
        assert!(columns.starts_with("id, title"));
        assert!(columns.contains("NULL AS is_public"));
        assert!(columns.contains("NULL AS view_count"));
        assert!(!columns.contains("NULL AS title"));
    }

    #[tokio::test]
    async fn criteria_compose_and_count() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query(
            "CREATE TABLE books (id INTEGER PRIMARY KEY, title TEXT NOT NULL,
             author TEXT, description TEXT, genre TEXT, language TEXT,
             copyright_status TEXT, source TEXT, is_public INTEGER,
             is_featured INTEGER, created_at INTEGER, updated_at INTEGER)",
        )
        .execute(&pool)
        .await
        .unwrap();
        for (title, lang, public, featured) in [
            ("Walden", "en", 1, 1),
            ("Walden Two", "en", 1, 0),
            ("Waldenbuch", "de", 1, 1),
            ("Hidden Walden", "en", 0, 1),
        ] {
            sqlx::query(
                "INSERT INTO books (title, language, is_public, is_featured, created_at, updated_at)
                 VALUES (?, ?, ?, ?, 0, 0)",
            )
            .bind(title)
            .bind(lang)
            .bind(public)
            .bind(featured)
            .execute(&pool)
            .await
            .unwrap();
        }
        let caps = SchemaCapabilities::probe(&pool).await.unwrap();

        let criteria = BookCriteria {
            search: Some("walden".to_string()),
            language: Some("en".to_string()),
            featured_only: true,
            ..Default::default()
        };

        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM books");
        let mut has_where = false;
        push_criteria(&mut qb, &mut has_where, &criteria, &caps);
        assert!(has_where);

        // public AND english AND featured AND matching "walden"
        let count: i64 = qb.build_query_scalar().fetch_one(&pool).await.unwrap();
        assert_eq!(count, 1);
    }
}
