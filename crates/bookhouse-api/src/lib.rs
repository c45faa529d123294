//! Bookhouse REST API Server
//!
//! HTTP/JSON API for browsing the book catalog and delivering content to web
//! clients and other HTTP consumers.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use bookhouse_catalog::CatalogStore;
use bookhouse_storage::ContentGateway;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error;
pub mod handlers;
pub mod models;

pub use error::{ApiError, ApiResult};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogStore>,
    pub gateway: Arc<ContentGateway>,
}

/// Create the API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    // API v1 routes
    let api_routes = Router::new()
        // Books
        .route(
            "/books",
            get(handlers::books::list_books).post(handlers::books::upload_book),
        )
        .route("/books/featured", get(handlers::browse::featured_books))
        .route("/books/public", get(handlers::browse::public_catalog))
        .route("/books/uploads", get(handlers::browse::user_uploads))
        .route(
            "/books/suggestions",
            get(handlers::browse::search_suggestions),
        )
        .route(
            "/books/:id",
            get(handlers::books::get_book)
                .put(handlers::books::update_book)
                .delete(handlers::books::delete_book),
        )
        .route("/books/:id/download", get(handlers::books::download_book))
        .route("/books/:id/view", post(handlers::books::record_view))
        .route(
            "/books/:id/downloaded",
            post(handlers::books::record_download),
        )
        .route("/books/:id/featured", patch(handlers::books::set_featured))
        .route(
            "/books/:id/visibility",
            patch(handlers::books::set_visibility),
        )
        // Aggregates and reference data
        .route("/stats", get(handlers::stats::get_stats))
        .route("/sources", get(handlers::stats::list_sources))
        // Book files routinely exceed axum's 2 MB default body cap
        .layer(DefaultBodyLimit::max(100 * 1024 * 1024))
        .with_state(state);

    // OpenAPI documentation
    let swagger = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi());

    // Main router with CORS
    Router::new()
        .nest("/api/v1", api_routes)
        .merge(swagger)
        .route("/health", get(handlers::stats::health_check))
        .layer(CorsLayer::permissive())
}

/// Start the API server
pub async fn serve(router: Router, addr: &str) -> Result<(), Box<dyn std::error::Error>> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🚀 REST API server listening on {}", addr);
    tracing::info!("   Swagger UI: http://{}/swagger-ui", addr);
    tracing::info!("   Health: http://{}/health", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Resolve when SIGINT or SIGTERM arrives, letting in-flight requests finish.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), shutting down");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        },
    }
}

/// OpenAPI specification
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::books::list_books,
        handlers::books::upload_book,
        handlers::books::get_book,
        handlers::books::update_book,
        handlers::books::delete_book,
        handlers::books::download_book,
        handlers::books::record_view,
        handlers::books::record_download,
        handlers::books::set_featured,
        handlers::books::set_visibility,
        handlers::browse::featured_books,
        handlers::browse::public_catalog,
        handlers::browse::user_uploads,
        handlers::browse::search_suggestions,
        handlers::stats::get_stats,
        handlers::stats::list_sources,
        handlers::stats::health_check,
    ),
    components(schemas(
        models::BookResponse,
        models::PaginatedBooksResponse,
        models::PaginationMeta,
        models::UpdateBookRequest,
        models::MessageResponse,
        models::DownloadLinkResponse,
        models::ViewRecordedResponse,
        models::DownloadRecordedResponse,
        models::DeleteResponse,
        models::SuggestionsResponse,
        models::StatsResponse,
        models::CopyrightCount,
        models::LanguageCount,
        models::AuthorCount,
        models::SourceResponse,
        models::HealthResponse,
        models::ErrorResponse,
    )),
    tags(
        (name = "books", description = "Book management and delivery"),
        (name = "browse", description = "Public catalog browsing"),
        (name = "stats", description = "Collection statistics and reference data"),
        (name = "health", description = "Health checks"),
    ),
    info(
        title = "Bookhouse API",
        version = "0.1.0",
        description = "REST API for Bookhouse - digital library catalog and delivery",
        contact(
            name = "Bookhouse",
            url = "https://github.com/bookhouse/bookhouse"
        )
    )
)]
struct ApiDoc;
