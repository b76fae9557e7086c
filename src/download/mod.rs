//! Materializing remote files on local disk.
//!
//! This module provides the [`DownloadSink`] seam used by the export
//! dispatcher, its streaming HTTP implementation [`HttpClient`], the
//! visit [`Pacer`], and filename sanitization for local paths.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use docexport_core::download::{DownloadSink, HttpClient};
//! use docexport_core::http_client::{DEFAULT_REFERER, SessionHeaders};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = SessionHeaders::new("sid=...", DEFAULT_REFERER);
//! let client = HttpClient::with_default_timeout(&session)?;
//! let bytes = client
//!     .fetch_to_file("https://example.com/paper.pdf", Path::new("./Export/paper.pdf"))
//!     .await?;
//! println!("Downloaded {bytes} bytes");
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use async_trait::async_trait;

mod client;
mod error;
mod filename;
pub mod rate_limiter;

pub use client::HttpClient;
pub use error::DownloadError;
pub use filename::sanitize_filename;
pub use rate_limiter::{DEFAULT_PACING_INTERVAL, Pacer};

/// Writes the body behind a URL to a local file.
///
/// Implementations create missing parent directories and overwrite any
/// existing file at `destination`.
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Fetches `url` into `destination`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError`] on transport, HTTP status or filesystem failure.
    async fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<u64, DownloadError>;
}

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
