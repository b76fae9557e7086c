//! Per-type export strategy selection and execution.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use super::error::ExportError;
use crate::catalog::{Catalog, CatalogError, FileNode, FileType, FormatToken};
use crate::download::{DownloadSink, sanitize_filename};

/// How a file of a given type is turned into a downloadable URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportStrategy {
    /// The type cannot be exported; the file is skipped with a warning.
    Unsupported,
    /// Resolve the raw content URL, then fetch it through the conversion service.
    ContentConversion(FormatToken),
    /// Ask the export endpoint for a converted file in the given format.
    Export(FormatToken),
    /// Download the node's own `downloadUrl` unchanged.
    Raw,
}

impl ExportStrategy {
    /// Selects the strategy for a declared file type.
    ///
    /// Unknown types fall back to [`ExportStrategy::Raw`].
    #[must_use]
    pub fn for_type(file_type: &FileType) -> Self {
        match file_type {
            FileType::Board | FileType::Form | FileType::Folder => Self::Unsupported,
            FileType::Mindmap => Self::ContentConversion(FormatToken::Xmind),
            FileType::Slide => Self::Export(FormatToken::Pptx),
            FileType::Mosheet => Self::Export(FormatToken::Xlsx),
            FileType::Modoc => Self::Export(FormatToken::Docx),
            FileType::Newdoc => Self::Export(FormatToken::Md),
            FileType::Xls | FileType::Pdf | FileType::Img | FileType::Other(_) => Self::Raw,
        }
    }

    /// Returns the format token, if this strategy converts the file.
    #[must_use]
    pub fn format(self) -> Option<FormatToken> {
        match self {
            Self::ContentConversion(format) | Self::Export(format) => Some(format),
            Self::Unsupported | Self::Raw => None,
        }
    }

    /// Local path a file named `name` is written to inside `dir`.
    ///
    /// Converted files get the format token as extension; raw files keep
    /// their display name as-is.
    #[must_use]
    pub fn destination(self, dir: &Path, name: &str) -> PathBuf {
        let base = sanitize_filename(name);
        match self.format() {
            Some(format) => dir.join(format!("{base}.{format}")),
            None => dir.join(base),
        }
    }
}

/// Result of exporting one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    /// The file was written to `path`.
    Exported {
        /// Local path written.
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// The file type has no export strategy.
    Skipped {
        /// The declared type that was skipped.
        file_type: FileType,
    },
}

/// A single export attempt for one file.
///
/// Implemented by [`ExportDispatcher`]; the retry controller depends on this
/// seam so attempts can be observed in tests.
#[async_trait]
pub trait FileExporter: Send + Sync {
    /// Exports `file` into the local directory `dir`.
    async fn export_file(&self, file: &FileNode, dir: &Path) -> Result<ExportOutcome, ExportError>;
}

/// Routes each file to its export strategy and hands the resolved URL to the sink.
#[derive(Clone)]
pub struct ExportDispatcher {
    catalog: Arc<dyn Catalog>,
    sink: Arc<dyn DownloadSink>,
}

impl std::fmt::Debug for ExportDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportDispatcher").finish_non_exhaustive()
    }
}

impl ExportDispatcher {
    /// Creates a dispatcher over a catalog and a download sink.
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, sink: Arc<dyn DownloadSink>) -> Self {
        Self { catalog, sink }
    }

    async fn source_url(
        &self,
        file: &FileNode,
        strategy: ExportStrategy,
    ) -> Result<Option<String>, CatalogError> {
        let url = match strategy {
            ExportStrategy::Unsupported => return Ok(None),
            ExportStrategy::ContentConversion(format) => {
                let content_url = self.catalog.content_url(&file.guid).await?;
                self.catalog
                    .conversion_url(&file.file_type, &content_url, format, &file.name)?
            }
            ExportStrategy::Export(format) => {
                self.catalog
                    .export_url(&file.guid, &file.name, format)
                    .await?
            }
            ExportStrategy::Raw => file
                .download_url
                .clone()
                .ok_or_else(|| CatalogError::missing_field(&file.guid, "downloadUrl"))?,
        };
        Ok(Some(url))
    }
}

#[async_trait]
impl FileExporter for ExportDispatcher {
    #[instrument(skip(self, file, dir), fields(guid = %file.guid, file_type = %file.file_type))]
    async fn export_file(&self, file: &FileNode, dir: &Path) -> Result<ExportOutcome, ExportError> {
        let strategy = ExportStrategy::for_type(&file.file_type);

        let Some(url) = self.source_url(file, strategy).await? else {
            warn!(name = %file.name, "file type cannot be exported, skipping");
            return Ok(ExportOutcome::Skipped {
                file_type: file.file_type.clone(),
            });
        };

        let path = strategy.destination(dir, &file.name);
        debug!(url = %url, path = %path.display(), "resolved export source");
        let bytes = self.sink.fetch_to_file(&url, &path).await?;
        Ok(ExportOutcome::Exported { path, bytes })
    }
}
