//! Docexport Core Library
//!
//! This library bulk-exports a remote document-folder tree from a cloud
//! document service into a local directory structure, converting each remote
//! document into a downloadable format appropriate to its type.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`catalog`] - Remote catalog client (folder metadata, listings, export URLs)
//! - [`download`] - Download sink that streams URLs to local files, plus pacing
//! - [`export`] - Folder walker, export dispatcher and retry controller
//! - [`config`] - Configuration document loading and run settings

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod download;
pub mod export;
pub mod http_client;
#[cfg(test)]
mod test_support;
mod user_agent;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, Endpoints, FileNode, FileType, FolderInfo, HttpCatalog};
pub use config::{ConfigError, ConfigOverrides, ExportConfig, RunSettings};
pub use download::{DownloadError, DownloadSink, HttpClient, Pacer};
pub use export::{
    AttemptReport, DEFAULT_MAX_RETRIES, ExportDispatcher, ExportError, ExportOutcome,
    ExportReport, ExportRun, ExportStats, ExportStatus, ExportStrategy, FileExporter,
    FolderWalker, FormatToken, RetryController, RetryPolicy,
};
pub use http_client::SessionHeaders;
