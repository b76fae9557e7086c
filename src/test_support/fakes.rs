//! In-memory `Catalog` and `DownloadSink` fakes that record every call.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use async_trait::async_trait;

use crate::catalog::{Catalog, CatalogError, FileNode, FileType, FolderInfo, FormatToken};
use crate::download::{DownloadError, DownloadSink};

/// One observed call against a fake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    FolderInfo(String),
    List(String),
    ContentUrl(String),
    ExportUrl {
        guid: String,
        name: String,
        format: FormatToken,
    },
    Fetch {
        url: String,
        destination: PathBuf,
    },
}

/// Time-stamped call log shared between a catalog fake and a sink fake.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<(Instant, Call)>>>,
}

impl CallLog {
    pub fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, call)| call.clone())
            .collect()
    }

    pub fn timed_calls(&self) -> Vec<(Instant, Call)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> Vec<(String, PathBuf)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Fetch { url, destination } => Some((url, destination)),
                _ => None,
            })
            .collect()
    }

    pub fn export_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::ExportUrl { .. }))
            .count()
    }
}

/// Catalog backed by a fixed in-memory tree.
#[derive(Debug, Default)]
pub struct FakeCatalog {
    log: CallLog,
    names: HashMap<String, String>,
    children: HashMap<String, Vec<FileNode>>,
    failing_listings: HashSet<String>,
    content_urls: HashMap<String, String>,
    export_failures: Mutex<HashMap<String, u32>>,
}

impl FakeCatalog {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            ..Self::default()
        }
    }

    pub fn folder(mut self, id: &str, name: &str, children: Vec<FileNode>) -> Self {
        self.names.insert(id.to_string(), name.to_string());
        self.children.insert(id.to_string(), children);
        self
    }

    pub fn failing_listing(mut self, id: &str) -> Self {
        self.failing_listings.insert(id.to_string());
        self
    }

    pub fn content(mut self, guid: &str, url: &str) -> Self {
        self.content_urls.insert(guid.to_string(), url.to_string());
        self
    }

    /// Makes the next `times` export requests for `guid` fail.
    pub fn failing_export(self, guid: &str, times: u32) -> Self {
        self.export_failures
            .lock()
            .unwrap()
            .insert(guid.to_string(), times);
        self
    }

    fn listing_url(folder_id: &str) -> String {
        format!("https://catalog.test/files?folder={folder_id}")
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn folder_info(&self, folder_id: &str) -> Result<FolderInfo, CatalogError> {
        self.log.record(Call::FolderInfo(folder_id.to_string()));
        match self.names.get(folder_id) {
            Some(name) => Ok(FolderInfo {
                guid: folder_id.to_string(),
                name: name.clone(),
            }),
            None => Err(CatalogError::http_status(Self::listing_url(folder_id), 404)),
        }
    }

    async fn list_children(&self, folder_id: &str) -> Result<Vec<FileNode>, CatalogError> {
        self.log.record(Call::List(folder_id.to_string()));
        if self.failing_listings.contains(folder_id) {
            return Err(CatalogError::http_status(Self::listing_url(folder_id), 500));
        }
        Ok(self.children.get(folder_id).cloned().unwrap_or_default())
    }

    async fn content_url(&self, guid: &str) -> Result<String, CatalogError> {
        self.log.record(Call::ContentUrl(guid.to_string()));
        self.content_urls
            .get(guid)
            .cloned()
            .ok_or_else(|| CatalogError::missing_field(guid, "contentUrl"))
    }

    async fn export_url(
        &self,
        guid: &str,
        name: &str,
        format: FormatToken,
    ) -> Result<String, CatalogError> {
        self.log.record(Call::ExportUrl {
            guid: guid.to_string(),
            name: name.to_string(),
            format,
        });
        let mut failures = self.export_failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(guid)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(CatalogError::http_status(
                format!("https://export.test/{guid}/export"),
                502,
            ));
        }
        Ok(format!("https://export.test/{guid}.{format}"))
    }

    fn conversion_url(
        &self,
        file_type: &FileType,
        content_url: &str,
        format: FormatToken,
        name: &str,
    ) -> Result<String, CatalogError> {
        Ok(format!(
            "https://api.test/{file_type}/exports?url={content_url}&format={format}&name={name}"
        ))
    }
}

/// Download sink that records fetches and optionally fails some URLs.
#[derive(Debug, Default)]
pub struct RecordingSink {
    log: CallLog,
    failing_urls: Mutex<HashMap<String, u32>>,
}

impl RecordingSink {
    pub fn new(log: &CallLog) -> Self {
        Self {
            log: log.clone(),
            ..Self::default()
        }
    }

    /// Makes the next `times` fetches of `url` fail with HTTP 503.
    pub fn failing(self, url: &str, times: u32) -> Self {
        self.failing_urls
            .lock()
            .unwrap()
            .insert(url.to_string(), times);
        self
    }
}

#[async_trait]
impl DownloadSink for RecordingSink {
    async fn fetch_to_file(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        self.log.record(Call::Fetch {
            url: url.to_string(),
            destination: destination.to_path_buf(),
        });
        let mut failures = self.failing_urls.lock().unwrap();
        if let Some(remaining) = failures.get_mut(url)
            && *remaining > 0
        {
            *remaining -= 1;
            return Err(DownloadError::http_status(url, 503));
        }
        Ok(url.len() as u64)
    }
}
