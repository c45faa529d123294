//! Bookhouse Server
//!
//! Main entry point for the Bookhouse digital library server.
//!
//! ## Overview
//! This server provides a REST API for browsing the book catalog, uploading
//! book content, and delivering downloads. Catalog metadata lives in SQLite;
//! book files live in S3-compatible object storage.
//!
//! ## Architecture
//! The server wires together three main components:
//! - **Catalog Store**: SQLite database for book metadata, counters, and sources
//! - **Object Store**: S3 (or local filesystem) holding the uploaded book files
//! - **Download Signer**: produces the URLs handed out for non-inline downloads
//!
//! ## Configuration
//! All configuration is done via environment variables:
//!
//! ### Server Settings
//! - `BOOKHOUSE_ADDR`: Server bind address (default: 0.0.0.0:8000)
//!
//! ### Storage Settings
//! - `BOOKHOUSE_DB`: SQLite database path (default: ./data/catalog.db)
//! - `BOOKHOUSE_BUCKET`: S3 bucket name (default: bookhouse)
//! - `BOOKHOUSE_KEY_PREFIX`: Object key prefix for uploads (default: books)
//! - `BOOKHOUSE_URL_TTL_SECS`: Download URL lifetime in seconds (default: 3600)
//! - `AWS_REGION`: AWS region (default: us-east-1)
//! - `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`: S3 credentials
//! - `S3_ENDPOINT`: Custom S3 endpoint URL, e.g. MinIO (optional)
//! - `S3_PUBLIC_ENDPOINT`: Endpoint embedded in download URLs when browsers
//!   cannot reach `S3_ENDPOINT` directly (optional)
//!
//! ### Local Development
//! - `USE_LOCAL_STORAGE`: Use local filesystem instead of S3 (any value)
//! - `LOCAL_STORAGE_PATH`: Path for local storage (default: ./data/storage)
//! - `BOOKHOUSE_PUBLIC_URL`: Base URL for download links in local mode
//!   (default: http://localhost:PORT/files, served by this process)
//!
//! ## Example Usage
//! ```bash
//! # Start with local storage (development)
//! export USE_LOCAL_STORAGE=1
//! cargo run -p bookhouse-server
//!
//! # Start against MinIO
//! export S3_ENDPOINT=http://localhost:9000
//! export AWS_ACCESS_KEY_ID=minioadmin
//! export AWS_SECRET_ACCESS_KEY=minioadmin
//! cargo run -p bookhouse-server
//! ```
//!
//! ## Logging
//! Logging is controlled via the `RUST_LOG` environment variable:
//! ```bash
//! RUST_LOG=debug cargo run -p bookhouse-server    # Detailed logs
//! RUST_LOG=info cargo run -p bookhouse-server     # Standard logs (default)
//! RUST_LOG=warn cargo run -p bookhouse-server     # Warnings only
//! ```

use std::sync::Arc;

use bookhouse_api::{create_router, AppState};
use bookhouse_catalog::SqliteCatalogStore;
use bookhouse_storage::{
    ContentGateway, DownloadSigner, GatewayConfig, PublicUrlSigner, S3Presigner,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Configuration
    let bind_addr = std::env::var("BOOKHOUSE_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());

    let db_path = std::env::var("BOOKHOUSE_DB").unwrap_or_else(|_| "./data/catalog.db".to_string());

    let bucket = std::env::var("BOOKHOUSE_BUCKET").unwrap_or_else(|_| "bookhouse".to_string());

    let gateway_config = GatewayConfig {
        key_prefix: std::env::var("BOOKHOUSE_KEY_PREFIX").unwrap_or_else(|_| "books".to_string()),
        url_ttl_secs: std::env::var("BOOKHOUSE_URL_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse()?,
    };

    // Initialize catalog store
    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    tracing::info!("Initializing catalog store at {}", db_path);
    let catalog = Arc::new(SqliteCatalogStore::new(&db_path).await?);

    // Initialize object store and download signer
    let (object_store, signer, local_files): (
        Arc<dyn object_store::ObjectStore>,
        Arc<dyn DownloadSigner>,
        Option<String>,
    ) = if std::env::var("USE_LOCAL_STORAGE").is_ok() {
        let local_path =
            std::env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./data/storage".to_string());
        std::fs::create_dir_all(&local_path)?;
        tracing::info!("Using local storage at {}", local_path);

        // Download links point back at this process, which serves the
        // storage directory under /files in local mode.
        let port = bind_addr.rsplit_once(':').map(|(_, p)| p).unwrap_or("8000");
        let public_base = std::env::var("BOOKHOUSE_PUBLIC_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}/files"));

        (
            Arc::new(object_store::local::LocalFileSystem::new_with_prefix(
                &local_path,
            )?),
            Arc::new(PublicUrlSigner::new(public_base)),
            Some(local_path),
        )
    } else {
        tracing::info!("Using S3 storage (bucket: {})", bucket);
        let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());
        let endpoint = std::env::var("S3_ENDPOINT").ok();
        let access_key = std::env::var("AWS_ACCESS_KEY_ID").unwrap_or_default();
        let secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").unwrap_or_default();

        let mut builder = object_store::aws::AmazonS3Builder::from_env().with_bucket_name(&bucket);
        if let Some(endpoint) = &endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }
        let s3 = builder.build()?;

        // Browsers resolve the presigned host themselves, which may differ
        // from the server-side endpoint inside a compose network.
        let public_endpoint = std::env::var("S3_PUBLIC_ENDPOINT").ok().or(endpoint);
        let signer = S3Presigner::new(
            bucket.clone(),
            region,
            public_endpoint,
            access_key,
            secret_key,
        );

        (Arc::new(s3), Arc::new(signer), None)
    };

    // Assemble the gateway and API state
    let gateway = Arc::new(ContentGateway::new(
        catalog.clone(),
        object_store,
        signer,
        gateway_config,
    ));

    let state = AppState {
        catalog: catalog.clone(),
        gateway,
    };

    let mut app = create_router(state);
    if let Some(dir) = local_files {
        app = app.nest_service("/files", tower_http::services::ServeDir::new(dir));
    }

    tracing::info!("Bookhouse server starting on {}", bind_addr);
    bookhouse_api::serve(app, &bind_addr).await
}
