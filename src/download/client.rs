//! HTTP client wrapper for downloading files.
//!
//! This module provides the `HttpClient` struct which streams a URL's body
//! into a fixed destination path, with the session headers and per-call
//! timeout applied to every request.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::DownloadSink;
use super::error::DownloadError;
use crate::http_client::{DEFAULT_TIMEOUT_SECS, SessionHeaders, build_http_client};

/// HTTP client for downloading files with streaming support.
///
/// This client is designed to be created once and reused for every download
/// in a run, taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use std::time::Duration;
/// use docexport_core::download::{DownloadSink, HttpClient};
/// use docexport_core::http_client::{DEFAULT_REFERER, SessionHeaders};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let session = SessionHeaders::new("sid=...", DEFAULT_REFERER);
/// let client = HttpClient::new(&session, Duration::from_secs(30))?;
/// let bytes = client
///     .fetch_to_file("https://example.com/file.pdf", Path::new("./Export/file.pdf"))
///     .await?;
/// println!("Downloaded {bytes} bytes");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a download client carrying the session headers.
    ///
    /// `timeout` bounds each download from connect to last byte.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the HTTP client cannot be built.
    pub fn new(session: &SessionHeaders, timeout: Duration) -> Result<Self, DownloadError> {
        let client = build_http_client("download", session, timeout)?;
        Ok(Self { client })
    }

    /// Creates a download client with the default 30 second timeout.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Client`] if the HTTP client cannot be built.
    pub fn with_default_timeout(session: &SessionHeaders) -> Result<Self, DownloadError> {
        Self::new(session, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Returns a reference to the underlying reqwest client.
    #[must_use]
    pub fn inner(&self) -> &Client {
        &self.client
    }

    async fn send_request(&self, url: &str) -> Result<reqwest::Response, DownloadError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::network(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url, status.as_u16()));
        }

        Ok(response)
    }
}

#[async_trait]
impl DownloadSink for HttpClient {
    /// Downloads `url` into `destination`, creating parent directories.
    ///
    /// An existing file at `destination` is overwritten. On failure the
    /// partially written file is removed.
    #[instrument(skip_all, fields(url = %url, path = %destination.display()))]
    async fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        debug!("starting download");

        Url::parse(url).map_err(|_| DownloadError::invalid_url(url))?;

        if let Some(parent) = destination.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DownloadError::io(parent, e))?;
        }

        let response = self.send_request(url).await?;

        let mut file = File::create(destination)
            .await
            .map_err(|e| DownloadError::io(destination, e))?;

        let stream_result = stream_to_file(&mut file, response, url, destination).await;
        drop(file);

        if stream_result.is_err() {
            debug!("cleaning up partial file after error");
            let _ = tokio::fs::remove_file(destination).await;
        }

        let bytes_written = stream_result?;
        info!(bytes = bytes_written, "download complete");
        Ok(bytes_written)
    }
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| DownloadError::network(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}
