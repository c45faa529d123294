//! BookHouse Storage Layer
//!
//! This crate implements the content side of BookHouse - the component
//! responsible for moving book files in and out of S3-compatible object
//! storage while keeping the catalog in step.
//!
//! ## What is the Storage Layer?
//!
//! The catalog crate knows *about* books; this crate holds their bytes. It
//! handles:
//!
//! 1. **Upload**: Validating formats, generating object keys, and writing
//!    content before the catalog row exists
//! 2. **Delivery**: Streaming PDFs for in-browser reading, or signing
//!    time-limited download URLs for everything else
//! 3. **Deletion**: Best-effort object removal that never strands a
//!    catalog row
//! 4. **Engagement**: View and download counters bumped off the request
//!    path
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐
//! │  API Layer   │
//! └──────┬───────┘
//!        │ upload / deliver / delete
//!        ▼
//! ┌──────────────────┐      ┌───────────────────┐
//! │  ContentGateway  │─────►│  CatalogStore     │
//! │  - validates     │ rows │  (SQLite)         │
//! │  - keys          │      └───────────────────┘
//! │  - orchestrates  │
//! └──────┬───────────┘
//!        │ bytes                 signed URLs
//!        ▼                            ▲
//! ┌──────────────────┐      ┌─────────┴─────────┐
//! │   ObjectStore    │      │  DownloadSigner   │
//! │  (S3 / MinIO /   │      │  (SigV4 presign)  │
//! │   local disk)    │      └───────────────────┘
//! └──────────────────┘
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use bookhouse_storage::{ContentGateway, DeliveryMode, GatewayConfig, S3Presigner};
//! use bookhouse_catalog::{NewBook, SqliteCatalogStore};
//! use object_store::aws::AmazonS3Builder;
//! use bytes::Bytes;
//!
//! let catalog = Arc::new(SqliteCatalogStore::new("catalog.db").await?);
//! let store = Arc::new(AmazonS3Builder::from_env().with_bucket_name("bookhouse").build()?);
//! let signer = Arc::new(S3Presigner::new(
//!     "bookhouse".into(), "us-east-1".into(), None, access_key, secret_key,
//! ));
//! let gateway = ContentGateway::new(catalog, store, signer, GatewayConfig::default());
//!
//! // Upload: bytes land in the store before the row lands in the catalog
//! let book = gateway
//!     .store_book(NewBook { title: "Walden".into(), ..Default::default() },
//!                 Bytes::from(pdf_bytes), "walden.pdf", Some("application/pdf"))
//!     .await?;
//!
//! // Deliver: PDFs stream inline, everything else gets a signed URL
//! let delivery = gateway.deliver(book.id, DeliveryMode::Attachment).await?;
//! ```
//!
//! ## Design Decisions
//!
//! ### Why Upload Before Insert?
//! - A row without content is a broken download link shown to users
//! - An object without a row is invisible garbage, cleaned up offline
//! - The second failure mode is strictly cheaper, so the object goes first
//!
//! ### Why a Separate Signer?
//! - Presigned URLs must be valid from the *browser's* network, which
//!   behind Docker is a different endpoint than the service uses
//! - Local development serves a directory over HTTP with no signing at all
//! - A trait seam keeps both out of the gateway's orchestration logic

pub mod config;
pub mod error;
pub mod format;
pub mod gateway;
pub mod key;
pub mod signer;

pub use config::GatewayConfig;
pub use error::{Error, Result};
pub use format::ALLOWED_EXTENSIONS;
pub use gateway::{ContentGateway, ContentStream, Delivery, DeliveryMode, DownloadLink};
pub use key::object_key;
pub use signer::{DownloadSigner, PublicUrlSigner, S3Presigner};
