//! REST implementation of the [`Catalog`] trait.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use super::{Catalog, CatalogError, FileNode, FileType, FolderInfo, FormatToken};
use crate::http_client::{SessionHeaders, build_http_client};

/// Default base URL of the files API (metadata, listings, content URLs).
pub const DEFAULT_FILES_BASE: &str = "https://shimo.im/lizard-api/files";

/// Default base URL of the export API.
pub const DEFAULT_EXPORT_BASE: &str = "https://xxport.shimo.im/files";

/// Default base URL of the conversion API (mind maps).
pub const DEFAULT_API_BASE: &str = "https://shimo.im/api";

/// Base URLs for the three remote APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    files: Url,
    export: Url,
    api: Url,
}

impl Endpoints {
    /// Parses and validates endpoint base URLs.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] if a URL does not parse or is
    /// not an `http`/`https` base URL.
    pub fn new(files: &str, export: &str, api: &str) -> Result<Self, CatalogError> {
        Ok(Self {
            files: parse_base(files)?,
            export: parse_base(export)?,
            api: parse_base(api)?,
        })
    }

    /// Endpoints pointing every API at the same base (useful for mock servers).
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidEndpoint`] for an unusable base URL.
    pub fn with_common_base(base: &str) -> Result<Self, CatalogError> {
        let base = base.trim_end_matches('/');
        Self::new(
            &format!("{base}/lizard-api/files"),
            &format!("{base}/xxport/files"),
            &format!("{base}/api"),
        )
    }

    /// Files API base.
    #[must_use]
    pub fn files(&self) -> &Url {
        &self.files
    }

    /// Export API base.
    #[must_use]
    pub fn export(&self) -> &Url {
        &self.export
    }

    /// Conversion API base.
    #[must_use]
    pub fn api(&self) -> &Url {
        &self.api
    }

    /// `GET {files}/{folder}?collaboratorCount=true`
    #[must_use]
    pub fn folder_info_url(&self, folder_id: &str) -> Url {
        endpoint(&self.files, &[folder_id], &[("collaboratorCount", "true")])
    }

    /// `GET {files}?collaboratorCount=true&folder={folder}`
    #[must_use]
    pub fn list_url(&self, folder_id: &str) -> Url {
        endpoint(
            &self.files,
            &[],
            &[("collaboratorCount", "true"), ("folder", folder_id)],
        )
    }

    /// `GET {files}/{guid}?contentUrl=true`
    #[must_use]
    pub fn content_url(&self, guid: &str) -> Url {
        endpoint(&self.files, &[guid], &[("contentUrl", "true")])
    }

    /// `GET {export}/{guid}/export?type={fmt}&file={guid}&returnJson=1&name={name}`
    #[must_use]
    pub fn export_url(&self, guid: &str, name: &str, format: FormatToken) -> Url {
        endpoint(
            &self.export,
            &[guid, "export"],
            &[
                ("type", format.as_str()),
                ("file", guid),
                ("returnJson", "1"),
                ("name", name),
            ],
        )
    }

    /// `{api}/{type}/exports?url={content}&format={fmt}&name={name}`
    #[must_use]
    pub fn conversion_url(
        &self,
        file_type: &FileType,
        content_url: &str,
        format: FormatToken,
        name: &str,
    ) -> Url {
        endpoint(
            &self.api,
            &[file_type.as_str(), "exports"],
            &[
                ("url", content_url),
                ("format", format.as_str()),
                ("name", name),
            ],
        )
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            files: default_base(DEFAULT_FILES_BASE),
            export: default_base(DEFAULT_EXPORT_BASE),
            api: default_base(DEFAULT_API_BASE),
        }
    }
}

#[allow(clippy::expect_used)]
fn default_base(raw: &str) -> Url {
    parse_base(raw).expect("built-in endpoint base URLs are valid")
}

fn parse_base(raw: &str) -> Result<Url, CatalogError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| CatalogError::invalid_endpoint(raw, e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::invalid_endpoint(
            raw,
            "scheme must be http or https",
        ));
    }
    if url.cannot_be_a_base() {
        return Err(CatalogError::invalid_endpoint(raw, "not a base URL"));
    }
    Ok(url)
}

fn endpoint(base: &Url, segments: &[&str], query: &[(&str, &str)]) -> Url {
    let mut url = base.clone();
    // Bases are validated by `parse_base`, so path segments are always available.
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty();
        path.extend(segments);
    }
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    url
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ContentUrlResponse {
    #[serde(default)]
    content_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportResponse {
    #[serde(default)]
    redirect_url: Option<String>,
}

/// Catalog client talking to the service's REST API.
///
/// Create once per run and share; the inner reqwest client pools connections.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: Client,
    endpoints: Endpoints,
}

impl HttpCatalog {
    /// Creates a catalog client with session headers and a per-call timeout.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Client`] if the HTTP client cannot be built
    /// (for example, a cookie containing line breaks).
    pub fn new(
        endpoints: Endpoints,
        session: &SessionHeaders,
        timeout: Duration,
    ) -> Result<Self, CatalogError> {
        let client = build_http_client("catalog", session, timeout)?;
        Ok(Self { client, endpoints })
    }

    /// Returns the configured endpoints.
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, CatalogError> {
        let url_str = url.to_string();
        debug!(url = %url_str, "catalog request");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CatalogError::request(&url_str, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::http_status(url_str, status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::request(&url_str, e))?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::malformed(url_str, e.to_string()))
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    #[instrument(skip(self))]
    async fn folder_info(&self, folder_id: &str) -> Result<FolderInfo, CatalogError> {
        self.get_json(self.endpoints.folder_info_url(folder_id))
            .await
    }

    #[instrument(skip(self))]
    async fn list_children(&self, folder_id: &str) -> Result<Vec<FileNode>, CatalogError> {
        let children: Vec<FileNode> = self.get_json(self.endpoints.list_url(folder_id)).await?;
        debug!(count = children.len(), "listed folder");
        Ok(children)
    }

    #[instrument(skip(self))]
    async fn content_url(&self, guid: &str) -> Result<String, CatalogError> {
        let response: ContentUrlResponse =
            self.get_json(self.endpoints.content_url(guid)).await?;
        response
            .content_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| CatalogError::missing_field(guid, "contentUrl"))
    }

    #[instrument(skip(self, format), fields(format = %format))]
    async fn export_url(
        &self,
        guid: &str,
        name: &str,
        format: FormatToken,
    ) -> Result<String, CatalogError> {
        let response: ExportResponse = self
            .get_json(self.endpoints.export_url(guid, name, format))
            .await?;
        response
            .redirect_url
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| CatalogError::missing_field(guid, "redirectUrl"))
    }

    fn conversion_url(
        &self,
        file_type: &FileType,
        content_url: &str,
        format: FormatToken,
        name: &str,
    ) -> Result<String, CatalogError> {
        Ok(self
            .endpoints
            .conversion_url(file_type, content_url, format, name)
            .to_string())
    }
}
