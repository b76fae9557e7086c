//! Error types for catalog operations.

use thiserror::Error;

use crate::http_client::HttpClientError;

/// Errors raised by listing, metadata and URL-resolution calls.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Network-level failure (DNS, connection refused, TLS).
    #[error("catalog request to {url} failed: {source}")]
    Network {
        /// Requested URL.
        url: String,
        /// Underlying error.
        #[source]
        source: reqwest::Error,
    },

    /// The call exceeded the per-call timeout.
    #[error("catalog request to {url} timed out")]
    Timeout {
        /// Requested URL.
        url: String,
    },

    /// The service answered with a non-success status.
    #[error("catalog returned HTTP {status} for {url}")]
    HttpStatus {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },

    /// The response body could not be decoded into the expected shape.
    #[error("malformed catalog response from {url}: {reason}")]
    Malformed {
        /// Requested URL.
        url: String,
        /// Decoder message.
        reason: String,
    },

    /// A field the exporter needs was absent or empty.
    #[error("catalog entry {guid} has no `{field}`")]
    MissingField {
        /// Entry the field belongs to.
        guid: String,
        /// Missing field name.
        field: &'static str,
    },

    /// An endpoint base URL is not usable.
    #[error("invalid catalog endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// Offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// HTTP client construction failed.
    #[error(transparent)]
    Client(#[from] HttpClientError),
}

impl CatalogError {
    /// Creates a network or timeout error from a reqwest error.
    pub fn request(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed-response error.
    pub fn malformed(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Creates a missing-field error.
    pub fn missing_field(guid: impl Into<String>, field: &'static str) -> Self {
        Self::MissingField {
            guid: guid.into(),
            field,
        }
    }

    /// Creates an invalid-endpoint error.
    pub fn invalid_endpoint(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
