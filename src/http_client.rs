//! Shared HTTP client construction policy.
//!
//! Both the catalog client and the download sink talk to the same service
//! with the same session, so client construction is centralized here:
//! session headers (cookie and referer), per-call timeout, user agent,
//! compression and proxy compatibility.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use reqwest::header::{COOKIE, HeaderMap, HeaderName, HeaderValue, REFERER};
use reqwest::{Client, ClientBuilder, Proxy};
use thiserror::Error;
use tracing::warn;

use crate::user_agent;

/// Connect timeout applied to every client (the per-call timeout still bounds the total).
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default per-call timeout (30 seconds).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Referer sent with every request unless configured otherwise.
pub const DEFAULT_REFERER: &str = "https://shimo.im/folder/123123";

/// Session headers attached to every catalog and download request.
#[derive(Clone)]
pub struct SessionHeaders {
    cookie: String,
    referer: String,
}

impl SessionHeaders {
    /// Creates session headers from a raw cookie string and referer URL.
    #[must_use]
    pub fn new(cookie: impl Into<String>, referer: impl Into<String>) -> Self {
        Self {
            cookie: cookie.into(),
            referer: referer.into(),
        }
    }

    /// Returns the referer URL.
    #[must_use]
    pub fn referer(&self) -> &str {
        &self.referer
    }

    fn header_map(&self) -> Result<HeaderMap, HttpClientError> {
        let mut headers = HeaderMap::new();
        let mut cookie = header_value(COOKIE, &self.cookie)?;
        cookie.set_sensitive(true);
        headers.insert(COOKIE, cookie);
        headers.insert(REFERER, header_value(REFERER, &self.referer)?);
        Ok(headers)
    }
}

// The cookie is a credential; keep it out of debug output and logs.
impl std::fmt::Debug for SessionHeaders {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHeaders")
            .field("cookie", &"<redacted>")
            .field("referer", &self.referer)
            .finish()
    }
}

fn header_value(name: HeaderName, value: &str) -> Result<HeaderValue, HttpClientError> {
    HeaderValue::from_str(value.trim()).map_err(|_| HttpClientError::InvalidHeader {
        name: name.as_str().to_string(),
    })
}

/// Errors raised while constructing an HTTP client.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// A session header contains characters not allowed in HTTP headers.
    #[error("invalid value for `{name}` header: must be visible ASCII without line breaks")]
    InvalidHeader {
        /// Header name.
        name: String,
    },

    /// The reqwest builder rejected the configuration.
    #[error("HTTP client construction failed for {component}: {source}")]
    Build {
        /// Which component requested the client.
        component: String,
        /// Underlying builder error.
        #[source]
        source: reqwest::Error,
    },

    /// The builder panicked even with the env-proxy fallback.
    #[error("HTTP client construction panicked for {component}")]
    Panicked {
        /// Which component requested the client.
        component: String,
    },
}

/// Builds an HTTP client carrying the session headers and per-call timeout.
///
/// `component` is only used for error messages and logging.
///
/// # Errors
///
/// Returns [`HttpClientError`] when a header value is invalid or client
/// construction fails.
pub fn build_http_client(
    component: &str,
    session: &SessionHeaders,
    timeout: Duration,
) -> Result<Client, HttpClientError> {
    let headers = session.header_map()?;

    match try_build_client(headers.clone(), timeout, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed environments panic when querying system proxy
            // settings; retry with env-proxy lookup only.
            warn!(
                component,
                "HTTP client hit system proxy panic; using env-proxy fallback builder"
            );
            match try_build_client(headers, timeout, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(HttpClientError::Panicked {
                    component: component.to_string(),
                }),
                Err(BuildClientFailure::Build(source)) => Err(HttpClientError::Build {
                    component: component.to_string(),
                    source,
                }),
            }
        }
        Err(BuildClientFailure::Build(source)) => Err(HttpClientError::Build {
            component: component.to_string(),
            source,
        }),
    }
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn try_build_client(
    headers: HeaderMap,
    timeout: Duration,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(headers, timeout);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(headers: HeaderMap, timeout: Duration) -> ClientBuilder {
    let connect_timeout = Duration::from_secs(CONNECT_TIMEOUT_SECS).min(timeout);
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(timeout)
        .default_headers(headers)
        .user_agent(user_agent::default_user_agent())
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_headers_debug_redacts_cookie() {
        let session = SessionHeaders::new("sid=secret-token", DEFAULT_REFERER);
        let debug = format!("{session:?}");
        assert!(!debug.contains("secret-token"), "cookie leaked: {debug}");
        assert!(debug.contains("<redacted>"));
        assert!(debug.contains(DEFAULT_REFERER));
    }

    #[test]
    fn test_header_map_marks_cookie_sensitive() {
        let session = SessionHeaders::new("sid=abc", "https://example.com/folder/1");
        let headers = session.header_map().unwrap();
        let cookie = headers.get(COOKIE).unwrap();
        assert!(cookie.is_sensitive());
        assert_eq!(cookie.to_str().unwrap(), "sid=abc");
        assert_eq!(
            headers.get(REFERER).unwrap().to_str().unwrap(),
            "https://example.com/folder/1"
        );
    }

    #[test]
    fn test_header_map_rejects_line_breaks() {
        let session = SessionHeaders::new("sid=abc\r\nX-Injected: 1", DEFAULT_REFERER);
        let err = session.header_map().unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidHeader { ref name } if name == "cookie"));
    }

    #[test]
    fn test_build_http_client_succeeds_with_valid_session() {
        let session = SessionHeaders::new("sid=abc", DEFAULT_REFERER);
        let client = build_http_client("test", &session, Duration::from_secs(5));
        assert!(client.is_ok());
    }
}
