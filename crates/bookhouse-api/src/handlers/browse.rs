//! Public catalog browsing endpoints
//!
//! These power the landing page and reader views: curated shelves, the
//! public-domain catalog, community uploads, and typeahead suggestions.
//! Everything here is scoped to what anonymous visitors may see.

use axum::extract::{Query, State};
use axum::Json;

use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/books/featured",
    params(("limit" = Option<u32>, Query, description = "Max books to return (default 10, max 50)")),
    responses(
        (status = 200, description = "Curated featured books, newest first", body = Vec<BookResponse>)
    ),
    tag = "browse"
)]
pub async fn featured_books(
    State(state): State<AppState>,
    Query(params): Query<LimitParam>,
) -> ApiResult<Json<Vec<BookResponse>>> {
    let limit = params.limit.unwrap_or(10).clamp(1, 50);
    let books = state.catalog.featured_books(limit).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/books/public",
    params(
        ("genre" = Option<String>, Query, description = "Genre filter; empty or \"all\" disables it"),
        ("limit" = Option<u32>, Query, description = "Max books to return (default 50, max 100)")
    ),
    responses(
        (status = 200, description = "Freely readable catalog, featured first", body = Vec<BookResponse>)
    ),
    tag = "browse"
)]
pub async fn public_catalog(
    State(state): State<AppState>,
    Query(params): Query<PublicCatalogParams>,
) -> ApiResult<Json<Vec<BookResponse>>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let books = state
        .catalog
        .public_books(params.genre.as_deref(), limit)
        .await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/books/uploads",
    params(("limit" = Option<u32>, Query, description = "Max books to return (default 50, max 100)")),
    responses(
        (status = 200, description = "Books uploaded by users, newest first", body = Vec<BookResponse>)
    ),
    tag = "browse"
)]
pub async fn user_uploads(
    State(state): State<AppState>,
    Query(params): Query<LimitParam>,
) -> ApiResult<Json<Vec<BookResponse>>> {
    let limit = params.limit.unwrap_or(50).clamp(1, 100);
    let books = state.catalog.user_uploads(limit).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/books/suggestions",
    params(("q" = String, Query, description = "Search prefix, at least 2 characters")),
    responses(
        (status = 200, description = "Title and author suggestions", body = SuggestionsResponse),
        (status = 400, description = "Query too short", body = ErrorResponse)
    ),
    tag = "browse"
)]
pub async fn search_suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestParams>,
) -> ApiResult<Json<SuggestionsResponse>> {
    let query = params.q.unwrap_or_default();
    if query.trim().chars().count() < 2 {
        return Err(ApiError::BadRequest(
            "query must be at least 2 characters".to_string(),
        ));
    }

    let suggestions = state.catalog.search_suggestions(&query).await?;
    Ok(Json(suggestions.into()))
}
