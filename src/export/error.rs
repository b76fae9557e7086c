//! Error types for the export module.

use std::path::PathBuf;

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::download::DownloadError;

/// Errors that can occur while exporting a single remote file.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The catalog could not resolve a URL for the file.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Fetching the resolved URL to disk failed.
    #[error(transparent)]
    Transport(#[from] DownloadError),

    /// A local directory could not be created.
    #[error("IO error creating {path}: {source}")]
    Io {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Every allowed attempt failed; `source` is the last failure.
    #[error("export of '{name}' ({guid}) failed after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Remote identifier of the file.
        guid: String,
        /// Display name of the file.
        name: String,
        /// Total attempts made, including the first.
        attempts: u32,
        /// The error from the final attempt.
        #[source]
        source: Box<ExportError>,
    },
}

impl ExportError {
    /// Creates a local directory error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Wraps the final failure of a file whose retries are used up.
    pub fn retry_exhausted(
        guid: impl Into<String>,
        name: impl Into<String>,
        attempts: u32,
        last: ExportError,
    ) -> Self {
        Self::RetryExhausted {
            guid: guid.into(),
            name: name.into(),
            attempts,
            source: Box::new(last),
        }
    }
}
