//! Book management and delivery endpoints

use axum::body::{Body, Bytes};
use axum::extract::multipart::Field;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use bookhouse_catalog::{BookCriteria, CatalogError, NewBook, PageRequest, Sort};
use bookhouse_storage::{Delivery, DeliveryMode};

use crate::error::{ApiError, ApiResult};
use crate::models::*;
use crate::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/books",
    params(
        ("page" = Option<u32>, Query, description = "Page number (1-based)"),
        ("per_page" = Option<u32>, Query, description = "Page size (max 100)"),
        ("search" = Option<String>, Query, description = "Substring match on title, author, or description"),
        ("author" = Option<String>, Query, description = "Author substring filter"),
        ("genre" = Option<String>, Query, description = "Genre filter"),
        ("language" = Option<String>, Query, description = "Language code filter"),
        ("copyright_status" = Option<String>, Query, description = "Copyright status filter"),
        ("featured_only" = Option<bool>, Query, description = "Only featured books"),
        ("public_only" = Option<bool>, Query, description = "Only public books (default: true)"),
        ("sort_by" = Option<String>, Query, description = "Sort field (default: created_at)"),
        ("sort_order" = Option<String>, Query, description = "asc or desc (default: desc)")
    ),
    responses(
        (status = 200, description = "One page of books", body = PaginatedBooksResponse)
    ),
    tag = "books"
)]
pub async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListBooksParams>,
) -> ApiResult<Json<PaginatedBooksResponse>> {
    let criteria = BookCriteria {
        search: params.search,
        author: params.author,
        genre: params.genre,
        language: params.language,
        copyright_status: params.copyright_status,
        featured_only: params.featured_only,
        public_only: params.public_only,
    };
    let sort = Sort::parse(
        params.sort_by.as_deref().unwrap_or("created_at"),
        params.sort_order.as_deref().unwrap_or("desc"),
    );
    let page = PageRequest::new(
        params.page.unwrap_or(1),
        params.per_page.unwrap_or(PageRequest::DEFAULT_PER_PAGE),
    );

    let books = state.catalog.list_books(&criteria, sort, page).await?;
    Ok(Json(books.into()))
}

#[utoipa::path(
    post,
    path = "/api/v1/books",
    request_body(content = String, content_type = "multipart/form-data",
        description = "Book file under `file` plus metadata form fields (title required)"),
    responses(
        (status = 201, description = "Book uploaded and cataloged", body = BookResponse),
        (status = 400, description = "Unsupported format or missing fields", body = ErrorResponse)
    ),
    tag = "books"
)]
pub async fn upload_book(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<BookResponse>)> {
    let mut draft = NewBook::default();
    let mut upload: Option<(String, Option<String>, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match name.as_str() {
            "file" => {
                let filename = field
                    .file_name()
                    .map(str::to_string)
                    .ok_or_else(|| ApiError::BadRequest("file part needs a filename".to_string()))?;
                let content_type = field.content_type().map(str::to_string);
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(e.to_string()))?;
                upload = Some((filename, content_type, data));
            }
            "title" => draft.title = field_text(field).await?,
            "author" => draft.author = Some(field_text(field).await?),
            "description" => draft.description = Some(field_text(field).await?),
            "genre" => draft.genre = Some(field_text(field).await?),
            "language" => draft.language = Some(field_text(field).await?),
            "copyright_status" => draft.copyright_status = Some(field_text(field).await?),
            "cover_url" => draft.cover_url = Some(field_text(field).await?),
            "is_public" => draft.is_public = field_text(field).await?.parse().unwrap_or(true),
            _ => {}
        }
    }

    let (filename, content_type, data) =
        upload.ok_or_else(|| ApiError::BadRequest("missing file part".to_string()))?;
    if draft.title.trim().is_empty() {
        return Err(ApiError::BadRequest("title is required".to_string()));
    }

    let book = state
        .gateway
        .store_book(draft, data, &filename, content_type.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

async fn field_text(field: Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "books"
)]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<BookResponse>> {
    let book = state
        .catalog
        .get_book(id)
        .await?
        .ok_or(CatalogError::BookNotFound(id))?;
    Ok(Json(book.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/books/{id}",
    params(("id" = i64, Path, description = "Book ID")),
    request_body = UpdateBookRequest,
    responses(
        (status = 200, description = "Updated book", body = BookResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "books"
)]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateBookRequest>,
) -> ApiResult<Json<BookResponse>> {
    let book = state.catalog.update_book(id, req.into()).await?;
    Ok(Json(book.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/books/{id}",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book deleted", body = DeleteResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "books"
)]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DeleteResponse>> {
    let book = state.gateway.delete_book(id).await?;
    Ok(Json(DeleteResponse {
        message: format!("Book '{}' deleted successfully", book.title),
        deleted_id: book.id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/books/{id}/download",
    params(
        ("id" = i64, Path, description = "Book ID"),
        ("inline" = Option<bool>, Query, description = "Stream PDFs in the browser instead of linking")
    ),
    responses(
        (status = 200, description = "PDF bytes when inline, otherwise a signed link", body = DownloadLinkResponse),
        (status = 404, description = "Book or its content not found", body = ErrorResponse)
    ),
    tag = "books"
)]
pub async fn download_book(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<DownloadParams>,
) -> ApiResult<Response> {
    let mode = if params.inline {
        DeliveryMode::Inline
    } else {
        DeliveryMode::Attachment
    };

    match state.gateway.deliver(id, mode).await? {
        Delivery::Stream(content) => Response::builder()
            .header(header::CONTENT_TYPE, content.content_type)
            .header(header::CONTENT_DISPOSITION, content.disposition)
            .header(header::CONTENT_LENGTH, content.size)
            .body(Body::from_stream(content.stream))
            .map_err(|e| ApiError::Internal(e.to_string())),
        Delivery::Redirect(link) => Ok(Json(DownloadLinkResponse {
            url: link.url,
            format: link.format,
        })
        .into_response()),
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/books/{id}/view",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "View recorded", body = ViewRecordedResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "books"
)]
pub async fn record_view(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ViewRecordedResponse>> {
    let total_views = state.catalog.record_view(id).await?;
    Ok(Json(ViewRecordedResponse {
        message: "View tracked".to_string(),
        total_views,
    }))
}

#[utoipa::path(
    post,
    path = "/api/v1/books/{id}/downloaded",
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Download recorded", body = DownloadRecordedResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "books"
)]
pub async fn record_download(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DownloadRecordedResponse>> {
    let total_downloads = state.catalog.record_download(id).await?;
    Ok(Json(DownloadRecordedResponse {
        message: "Download tracked".to_string(),
        total_downloads,
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v1/books/{id}/featured",
    params(
        ("id" = i64, Path, description = "Book ID"),
        ("featured" = bool, Query, description = "New featured state")
    ),
    responses(
        (status = 200, description = "Featured state changed", body = MessageResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "books"
)]
pub async fn set_featured(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<FeatureParams>,
) -> ApiResult<Json<MessageResponse>> {
    state.catalog.set_featured(id, params.featured).await?;
    let verb = if params.featured { "featured" } else { "unfeatured" };
    Ok(Json(MessageResponse {
        message: format!("Book {verb} successfully"),
    }))
}

#[utoipa::path(
    patch,
    path = "/api/v1/books/{id}/visibility",
    params(
        ("id" = i64, Path, description = "Book ID"),
        ("is_public" = bool, Query, description = "New visibility state")
    ),
    responses(
        (status = 200, description = "Visibility changed", body = MessageResponse),
        (status = 404, description = "Book not found", body = ErrorResponse)
    ),
    tag = "books"
)]
pub async fn set_visibility(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(params): Query<VisibilityParams>,
) -> ApiResult<Json<MessageResponse>> {
    state.catalog.set_visibility(id, params.is_public).await?;
    let verb = if params.is_public { "published" } else { "hidden" };
    Ok(Json(MessageResponse {
        message: format!("Book {verb} successfully"),
    }))
}
