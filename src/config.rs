//! Configuration document loading and run settings resolution.
//!
//! The configuration is a JSON document:
//!
//! ```json
//! {
//!   "cookie": "shimo_sid=...",
//!   "path": "Export",
//!   "folders": ["5xkGMmrmmefKYV3X", "Ee32MvPPWAuoZB3J"]
//! }
//! ```
//!
//! `folders` may also be a single string. Tuning keys (`referer`, `pacingMs`,
//! `retryDelayMs`, `maxRetries`, `timeoutSecs`, `endpoints`) are optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::catalog::{CatalogError, Endpoints};
use crate::download::DEFAULT_PACING_INTERVAL;
use crate::export::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use crate::http_client::{DEFAULT_REFERER, DEFAULT_TIMEOUT_SECS, SessionHeaders};

/// Largest accepted pacing interval or retry delay, in milliseconds.
pub const MAX_INTERVAL_MS: u64 = 60_000;

/// Largest accepted retry count.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read config file {path}: {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON of the expected shape.
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A value is out of range or empty.
    #[error("invalid config value for `{field}`: {message}")]
    Invalid {
        /// Offending key.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// An endpoint override is not a usable base URL.
    #[error(transparent)]
    Endpoint(#[from] CatalogError),
}

impl ConfigError {
    fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// One folder id or a list of them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FolderIds {
    /// A single folder id.
    One(String),
    /// Several folder ids, exported in order.
    Many(Vec<String>),
}

impl FolderIds {
    /// Returns the ids as a list.
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::One(id) => vec![id.clone()],
            Self::Many(ids) => ids.clone(),
        }
    }
}

/// Optional endpoint base overrides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct EndpointOverrides {
    /// Files API base.
    pub files: Option<String>,
    /// Export API base.
    pub export: Option<String>,
    /// Conversion API base.
    pub api: Option<String>,
}

/// The configuration document as written on disk.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfig {
    /// Raw `Cookie` header value of an authenticated session.
    pub cookie: String,
    /// Local root directory for the export.
    pub path: PathBuf,
    /// Remote folder ids to export.
    pub folders: FolderIds,
    /// `Referer` header value.
    #[serde(default)]
    pub referer: Option<String>,
    /// Interval between consecutive node visits, in milliseconds.
    #[serde(default)]
    pub pacing_ms: Option<u64>,
    /// Fixed delay between retries, in milliseconds.
    #[serde(default)]
    pub retry_delay_ms: Option<u64>,
    /// Retries allowed per file after the first attempt.
    #[serde(default)]
    pub max_retries: Option<u32>,
    /// Per-call network timeout, in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Endpoint base overrides.
    #[serde(default)]
    pub endpoints: EndpointOverrides,
}

impl std::fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportConfig")
            .field("cookie", &"<redacted>")
            .field("path", &self.path)
            .field("folders", &self.folders)
            .field("referer", &self.referer)
            .field("pacing_ms", &self.pacing_ms)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("max_retries", &self.max_retries)
            .field("timeout_secs", &self.timeout_secs)
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    /// Replaces `path`.
    pub output_dir: Option<PathBuf>,
    /// Replaces `pacingMs`.
    pub pacing_ms: Option<u64>,
    /// Replaces `maxRetries`.
    pub max_retries: Option<u32>,
}

impl ExportConfig {
    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&raw).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Parses and validates a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for values that fail validation.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validates values against runtime constraints.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cookie.trim().is_empty() {
            return Err(ConfigError::invalid("cookie", "must not be empty"));
        }
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::invalid("path", "must not be empty"));
        }
        let folders = self.folders.to_vec();
        if folders.is_empty() {
            return Err(ConfigError::invalid("folders", "expected at least one folder id"));
        }
        if folders.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::invalid("folders", "folder ids must not be empty"));
        }
        validate_interval_ms("pacingMs", self.pacing_ms)?;
        validate_interval_ms("retryDelayMs", self.retry_delay_ms)?;
        validate_max_retries(self.max_retries)?;
        validate_timeout_secs(self.timeout_secs)?;
        Ok(())
    }

    /// Applies command-line overrides and resolves defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if an override is out of range or an endpoint
    /// base URL is unusable.
    pub fn resolve(&self, overrides: &ConfigOverrides) -> Result<RunSettings, ConfigError> {
        validate_interval_ms("pacingMs", overrides.pacing_ms)?;
        validate_max_retries(overrides.max_retries)?;

        let defaults = Endpoints::default();
        let endpoints = match &self.endpoints {
            EndpointOverrides {
                files: None,
                export: None,
                api: None,
            } => defaults,
            custom => Endpoints::new(
                custom.files.as_deref().unwrap_or(defaults.files().as_str()),
                custom.export.as_deref().unwrap_or(defaults.export().as_str()),
                custom.api.as_deref().unwrap_or(defaults.api().as_str()),
            )?,
        };

        let referer = self.referer.as_deref().unwrap_or(DEFAULT_REFERER);
        let pacing_ms = overrides.pacing_ms.or(self.pacing_ms);

        Ok(RunSettings {
            session: SessionHeaders::new(self.cookie.trim(), referer),
            root_path: overrides
                .output_dir
                .clone()
                .unwrap_or_else(|| self.path.clone()),
            folder_ids: self
                .folders
                .to_vec()
                .into_iter()
                .map(|id| id.trim().to_string())
                .collect(),
            pacing: pacing_ms.map_or(DEFAULT_PACING_INTERVAL, Duration::from_millis),
            retry_delay: self
                .retry_delay_ms
                .map_or(DEFAULT_RETRY_DELAY, Duration::from_millis),
            max_retries: overrides
                .max_retries
                .or(self.max_retries)
                .unwrap_or(DEFAULT_MAX_RETRIES),
            timeout: Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            endpoints,
        })
    }
}

fn validate_interval_ms(field: &'static str, value: Option<u64>) -> Result<(), ConfigError> {
    let Some(value) = value else {
        return Ok(());
    };
    if value > MAX_INTERVAL_MS {
        return Err(ConfigError::invalid(
            field,
            format!("{value}. Expected range: 0..={MAX_INTERVAL_MS}"),
        ));
    }
    Ok(())
}

fn validate_max_retries(value: Option<u32>) -> Result<(), ConfigError> {
    let Some(value) = value else {
        return Ok(());
    };
    if value > MAX_RETRIES_LIMIT {
        return Err(ConfigError::invalid(
            "maxRetries",
            format!("{value}. Expected range: 0..={MAX_RETRIES_LIMIT}"),
        ));
    }
    Ok(())
}

fn validate_timeout_secs(value: Option<u64>) -> Result<(), ConfigError> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        return Err(ConfigError::invalid(
            "timeoutSecs",
            format!("{value}. Expected range: 1..=3600"),
        ));
    }
    Ok(())
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Session headers (cookie and referer) for every request.
    pub session: SessionHeaders,
    /// Local directory the top-level folders are exported into.
    pub root_path: PathBuf,
    /// Remote folder ids, exported in order.
    pub folder_ids: Vec<String>,
    /// Interval between consecutive node visits.
    pub pacing: Duration,
    /// Fixed delay between retries.
    pub retry_delay: Duration,
    /// Retries allowed per file.
    pub max_retries: u32,
    /// Per-call network timeout.
    pub timeout: Duration,
    /// Remote API bases.
    pub endpoints: Endpoints,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            session: SessionHeaders::new("", DEFAULT_REFERER),
            root_path: PathBuf::from("Export"),
            folder_ids: Vec::new(),
            pacing: DEFAULT_PACING_INTERVAL,
            retry_delay: DEFAULT_RETRY_DELAY,
            max_retries: DEFAULT_MAX_RETRIES,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            endpoints: Endpoints::default(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use std::io::Write;

    use tempfile::NamedTempFile;

    const MINIMAL: &str = r#"{"cookie": "sid=abc", "path": "Export", "folders": "F1"}"#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = ExportConfig::from_json(MINIMAL).unwrap();
        let settings = config.resolve(&ConfigOverrides::default()).unwrap();

        assert_eq!(settings.root_path, PathBuf::from("Export"));
        assert_eq!(settings.folder_ids, vec!["F1".to_string()]);
        assert_eq!(settings.pacing, Duration::from_secs(1));
        assert_eq!(settings.retry_delay, Duration::from_secs(1));
        assert_eq!(settings.max_retries, 3);
        assert_eq!(settings.timeout, Duration::from_secs(30));
        assert_eq!(settings.session.referer(), DEFAULT_REFERER);
        assert_eq!(settings.endpoints, Endpoints::default());
    }

    #[test]
    fn test_folders_accepts_list() {
        let config = ExportConfig::from_json(
            r#"{"cookie": "sid=abc", "path": "out", "folders": ["F1", "F2"]}"#,
        )
        .unwrap();
        assert_eq!(config.folders.to_vec(), vec!["F1", "F2"]);
    }

    #[test]
    fn test_tuning_keys_are_applied() {
        let config = ExportConfig::from_json(
            r#"{
                "cookie": "sid=abc",
                "path": "out",
                "folders": ["F1"],
                "referer": "https://example.com/folder/1",
                "pacingMs": 250,
                "retryDelayMs": 10,
                "maxRetries": 5,
                "timeoutSecs": 12,
                "endpoints": {"files": "http://127.0.0.1:9000/files"}
            }"#,
        )
        .unwrap();
        let settings = config.resolve(&ConfigOverrides::default()).unwrap();

        assert_eq!(settings.pacing, Duration::from_millis(250));
        assert_eq!(settings.retry_delay, Duration::from_millis(10));
        assert_eq!(settings.max_retries, 5);
        assert_eq!(settings.timeout, Duration::from_secs(12));
        assert_eq!(settings.session.referer(), "https://example.com/folder/1");
        assert_eq!(
            settings.endpoints.list_url("F1").as_str(),
            "http://127.0.0.1:9000/files?collaboratorCount=true&folder=F1"
        );
    }

    #[test]
    fn test_cli_overrides_take_precedence() {
        let config = ExportConfig::from_json(
            r#"{"cookie": "c", "path": "out", "folders": "F1", "pacingMs": 900, "maxRetries": 2}"#,
        )
        .unwrap();
        let overrides = ConfigOverrides {
            output_dir: Some(PathBuf::from("/tmp/elsewhere")),
            pacing_ms: Some(0),
            max_retries: Some(7),
        };
        let settings = config.resolve(&overrides).unwrap();

        assert_eq!(settings.root_path, PathBuf::from("/tmp/elsewhere"));
        assert_eq!(settings.pacing, Duration::ZERO);
        assert_eq!(settings.max_retries, 7);
    }

    #[test]
    fn test_empty_cookie_is_rejected() {
        let err = ExportConfig::from_json(r#"{"cookie": " ", "path": "out", "folders": "F1"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "cookie", .. }));
    }

    #[test]
    fn test_empty_folder_list_is_rejected() {
        let err = ExportConfig::from_json(r#"{"cookie": "c", "path": "out", "folders": []}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "folders", .. }));

        let err = ExportConfig::from_json(r#"{"cookie": "c", "path": "out", "folders": ["F1", ""]}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "folders", .. }));
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let cases = [
            (r#""pacingMs": 60001"#, "pacingMs"),
            (r#""retryDelayMs": 70000"#, "retryDelayMs"),
            (r#""maxRetries": 11"#, "maxRetries"),
            (r#""timeoutSecs": 0"#, "timeoutSecs"),
            (r#""timeoutSecs": 3601"#, "timeoutSecs"),
        ];
        for (fragment, expected) in cases {
            let raw = format!(r#"{{"cookie": "c", "path": "out", "folders": "F1", {fragment}}}"#);
            match ExportConfig::from_json(&raw) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
                other => panic!("Expected Invalid for {fragment}, got: {other:?}"),
            }
        }
    }

    #[test]
    fn test_out_of_range_override_is_rejected() {
        let config = ExportConfig::from_json(MINIMAL).unwrap();
        let overrides = ConfigOverrides {
            max_retries: Some(99),
            ..ConfigOverrides::default()
        };
        assert!(matches!(
            config.resolve(&overrides),
            Err(ConfigError::Invalid { field: "maxRetries", .. })
        ));
    }

    #[test]
    fn test_missing_required_key_is_parse_error() {
        let err = ExportConfig::from_json(r#"{"cookie": "c", "folders": "F1"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_invalid_endpoint_is_rejected() {
        let config = ExportConfig::from_json(
            r#"{"cookie": "c", "path": "out", "folders": "F1", "endpoints": {"api": "ftp://nope"}}"#,
        )
        .unwrap();
        assert!(matches!(
            config.resolve(&ConfigOverrides::default()),
            Err(ConfigError::Endpoint(_))
        ));
    }

    #[test]
    fn test_load_reports_path_on_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();

        let err = ExportConfig::load(file.path()).unwrap_err();
        match err {
            ConfigError::Parse { path, .. } => assert_eq!(path, file.path()),
            other => panic!("Expected Parse, got: {other:?}"),
        }
    }

    #[test]
    fn test_load_missing_file_is_read_error() {
        let err = ExportConfig::load(Path::new("/definitely/not/here/config.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_debug_redacts_cookie() {
        let config = ExportConfig::from_json(MINIMAL).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("sid=abc"));
    }
}
