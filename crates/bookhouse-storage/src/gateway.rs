//! Content Gateway
//!
//! The gateway couples the object store with the catalog so that book
//! content and book metadata stay consistent:
//!
//! - **Upload** validates the file format, derives a collision-free object
//!   key, uploads the bytes, and only then inserts the catalog row. A
//!   failed upload therefore never leaves a row pointing at nothing; a
//!   failed insert leaves at worst an unreferenced object.
//! - **Delivery** either streams PDF bytes straight from the store for
//!   in-browser reading or hands out a time-limited signed URL with
//!   download headers. Engagement counters are bumped in the background
//!   and never fail a delivery.
//! - **Deletion** removes the stored object on a best-effort basis before
//!   removing the row, so a missing or unreachable object cannot strand
//!   the catalog entry.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::stream::BoxStream;
use object_store::path::Path;
use object_store::ObjectStore;

use bookhouse_catalog::{Book, CatalogError, CatalogStore, NewBook, USER_UPLOAD_SOURCE};

use crate::config::GatewayConfig;
use crate::error::{Error, Result};
use crate::format;
use crate::key;
use crate::signer::DownloadSigner;

/// How the caller wants book content served.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// Render in the browser. Honored for PDFs only; other formats fall
    /// back to an attachment link.
    Inline,
    /// Signed URL that downloads with an `attachment` disposition.
    Attachment,
}

/// Byte stream plus the response headers to serve it with.
pub struct ContentStream {
    pub stream: BoxStream<'static, object_store::Result<Bytes>>,
    pub content_type: String,
    pub disposition: String,
    pub size: usize,
}

impl std::fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStream")
            .field("content_type", &self.content_type)
            .field("disposition", &self.disposition)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Signed download URL and the format label shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub url: String,
    /// Uppercased file extension, e.g. "PDF" or "EPUB".
    pub format: String,
}

/// Outcome of a delivery request.
#[derive(Debug)]
pub enum Delivery {
    /// Serve these bytes directly.
    Stream(ContentStream),
    /// Redirect the client to this URL.
    Redirect(DownloadLink),
}

/// Counters bumped after a successful delivery.
#[derive(Debug, Clone, Copy)]
enum Counter {
    View,
    Download,
}

/// Orchestrates uploads, deliveries, and deletions across the object
/// store and the catalog.
///
/// All collaborators are injected, so tests can swap in an in-memory
/// store or a canned signer without touching S3.
pub struct ContentGateway {
    catalog: Arc<dyn CatalogStore>,
    store: Arc<dyn ObjectStore>,
    signer: Arc<dyn DownloadSigner>,
    config: GatewayConfig,
}

impl ContentGateway {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        store: Arc<dyn ObjectStore>,
        signer: Arc<dyn DownloadSigner>,
        config: GatewayConfig,
    ) -> Self {
        Self {
            catalog,
            store,
            signer,
            config,
        }
    }

    /// Validate, upload, and catalog a new book in one call.
    ///
    /// The object is written before the row is inserted. `filename`,
    /// `object_key`, and `file_size` on `new_book` are overwritten from
    /// the actual upload; a missing `source` is labeled as a user upload
    /// so the row stays visible in the uploads listing.
    ///
    /// # Errors
    ///
    /// [`Error::UnsupportedFormat`] if neither the content type nor the
    /// file extension is an accepted book format; upload and catalog
    /// failures propagate as-is.
    #[tracing::instrument(skip(self, new_book, content), fields(title = %new_book.title, filename = %filename))]
    pub async fn store_book(
        &self,
        mut new_book: NewBook,
        content: Bytes,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<Book> {
        format::validate(content_type, filename)?;

        let object_key = key::object_key(&self.config.key_prefix, &new_book.title, filename);
        let file_size = content.len() as i64;

        let path = Path::from(object_key.as_str());
        self.store.put(&path, content).await?;
        tracing::info!(key = %object_key, size = file_size, "uploaded book content");

        new_book.filename = Some(filename.to_string());
        new_book.object_key = Some(object_key);
        new_book.file_size = Some(file_size);
        if new_book.source.is_none() {
            new_book.source = Some(USER_UPLOAD_SOURCE.to_string());
        }

        Ok(self.catalog.create_book(new_book).await?)
    }

    /// Serve a book's content.
    ///
    /// PDFs requested inline are streamed with an `inline` disposition and
    /// count as a view. Everything else resolves to a signed URL carrying
    /// an `attachment` disposition and counts as a download. Counter bumps
    /// run in the background; a failed bump is logged, not surfaced.
    ///
    /// # Errors
    ///
    /// [`CatalogError::BookNotFound`] when the row does not exist,
    /// [`Error::MissingContent`] when the row has no stored object.
    #[tracing::instrument(skip(self))]
    pub async fn deliver(&self, id: i64, mode: DeliveryMode) -> Result<Delivery> {
        let book = self
            .catalog
            .get_book(id)
            .await?
            .ok_or(CatalogError::BookNotFound(id))?;
        let object_key = book.object_key.as_deref().ok_or(Error::MissingContent(id))?;

        let ext = format::delivery_extension(book.filename.as_deref());
        let content_type = format::content_type_for(&ext);
        let filename = book
            .filename
            .clone()
            .unwrap_or_else(|| format!("{}.{}", book.title, ext));

        if mode == DeliveryMode::Inline && ext == "pdf" {
            let result = self.store.get(&Path::from(object_key)).await?;
            let size = result.meta.size;
            self.bump_in_background(id, Counter::View);

            return Ok(Delivery::Stream(ContentStream {
                stream: result.into_stream(),
                content_type: content_type.to_string(),
                disposition: format!("inline; filename=\"{filename}\""),
                size,
            }));
        }

        let disposition = format!("attachment; filename=\"{filename}\"");
        let url = self
            .signer
            .signed_url(
                object_key,
                content_type,
                &disposition,
                Duration::from_secs(self.config.url_ttl_secs),
            )
            .await?;
        self.bump_in_background(id, Counter::Download);

        Ok(Delivery::Redirect(DownloadLink {
            url,
            format: ext.to_uppercase(),
        }))
    }

    /// Delete a book and its stored content.
    ///
    /// The object delete is best effort: an unreachable store or an
    /// already-missing object is logged and the catalog row is removed
    /// anyway. Returns the deleted book so callers can report what went
    /// away.
    #[tracing::instrument(skip(self))]
    pub async fn delete_book(&self, id: i64) -> Result<Book> {
        let book = self
            .catalog
            .get_book(id)
            .await?
            .ok_or(CatalogError::BookNotFound(id))?;

        if let Some(object_key) = &book.object_key {
            if let Err(error) = self.store.delete(&Path::from(object_key.as_str())).await {
                tracing::warn!(
                    book_id = id,
                    key = %object_key,
                    %error,
                    "failed to delete stored content, removing catalog entry anyway"
                );
            }
        }

        self.catalog.delete_book(id).await?;
        Ok(book)
    }

    /// Bump an engagement counter without blocking or failing the caller.
    fn bump_in_background(&self, id: i64, counter: Counter) {
        let catalog = Arc::clone(&self.catalog);
        tokio::spawn(async move {
            let outcome = match counter {
                Counter::View => catalog.record_view(id).await,
                Counter::Download => catalog.record_download(id).await,
            };
            if let Err(error) = outcome {
                tracing::warn!(book_id = id, ?counter, %error, "counter bump failed");
            }
        });
    }
}
