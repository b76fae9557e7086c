//! Remote catalog client for the document service.
//!
//! The catalog answers four questions for the exporter: what a folder is
//! called, what a folder contains (in display order), where a document's raw
//! content lives, and where a converted export of a document can be fetched.
//!
//! # Architecture
//!
//! - [`Catalog`] - Async trait the exporter depends on
//! - [`HttpCatalog`] - REST implementation authenticated with session headers
//! - [`Endpoints`] - Base URLs for the files, export and conversion APIs
//! - [`FileNode`] / [`FileType`] / [`FormatToken`] - Catalog data model
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use docexport_core::catalog::{Catalog, Endpoints, HttpCatalog};
//! use docexport_core::http_client::{DEFAULT_REFERER, SessionHeaders};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = SessionHeaders::new("sid=...", DEFAULT_REFERER);
//! let catalog = HttpCatalog::new(Endpoints::default(), &session, Duration::from_secs(30))?;
//! for node in catalog.list_children("5xkGMmrmmefKYV3X").await? {
//!     println!("{} ({})", node.name, node.file_type);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod model;

pub use client::{Endpoints, HttpCatalog};
pub use error::CatalogError;
pub use model::{FileNode, FileType, FolderInfo, FormatToken};

use async_trait::async_trait;

/// Read-only view of the remote catalog.
///
/// # Object Safety
///
/// Uses `async_trait` so the exporter can hold `Arc<dyn Catalog>` and tests
/// can substitute in-memory fakes.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetches folder metadata (used for the root folder's display name).
    async fn folder_info(&self, folder_id: &str) -> Result<FolderInfo, CatalogError>;

    /// Lists a folder's children in the order the service returns them.
    async fn list_children(&self, folder_id: &str) -> Result<Vec<FileNode>, CatalogError>;

    /// Resolves the raw content URL of a document.
    async fn content_url(&self, guid: &str) -> Result<String, CatalogError>;

    /// Requests a converted export and returns the URL it can be fetched from.
    async fn export_url(
        &self,
        guid: &str,
        name: &str,
        format: FormatToken,
    ) -> Result<String, CatalogError>;

    /// Builds the conversion-service URL that renders `content_url` into `format`.
    ///
    /// No request is made; the returned URL is fetched by the download sink.
    fn conversion_url(
        &self,
        file_type: &FileType,
        content_url: &str,
        format: FormatToken,
        name: &str,
    ) -> Result<String, CatalogError>;
}
