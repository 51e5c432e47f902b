//! HTTP client wrapper for upstream services.
//!
//! Every call to the Seeklit API server or the media server goes through
//! [`ApiClient`]. It resolves the base URL, attaches JSON headers and the
//! bearer token, applies a fixed timeout, and folds every failure into a
//! single [`ApiError`] that carries a human-readable message.
//!
//! # Base URL resolution
//!
//! 1. An explicit URL passed by the caller
//! 2. The configured URL (ignored when empty or a `BAKED_` placeholder)
//! 3. The origin of the inbound request
//!
//! A trailing slash is always ensured so relative joins keep the base path.

pub mod media_server;
pub mod seeklit;

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::usable_value;

pub use media_server::MediaServerClient;
pub use seeklit::{SeeklitClient, TokensResponse};

/// Timeout for identity and auth calls.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(5);
/// Timeout for media server calls.
pub const MEDIA_SERVER_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for Seeklit CRUD and search calls.
pub const API_TIMEOUT: Duration = Duration::from_secs(30);

/// What went wrong talking to an upstream service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiErrorKind {
    /// No HTTP status was received (connection refused, DNS, timeout).
    Transport,
    /// The upstream answered with a non-2xx status.
    Status,
    /// The body could not be decoded into the expected shape.
    Decode,
    /// The base URL or path could not be turned into a URL.
    InvalidUrl,
}

/// Normalized upstream failure.
///
/// Only the extracted message is kept; raw bodies and reqwest internals never
/// leave this module.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ApiErrorKind,
    status: Option<StatusCode>,
    message: String,
}

impl ApiError {
    fn transport(err: &reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Transport,
            status: None,
            message: err.to_string(),
        }
    }

    /// Build an error from a non-2xx response body.
    #[must_use]
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        Self {
            kind: ApiErrorKind::Status,
            status: Some(status),
            message: extract_message(status, body),
        }
    }

    fn decode(err: &serde_json::Error) -> Self {
        Self {
            kind: ApiErrorKind::Decode,
            status: None,
            message: format!("Unexpected response from server: {err}"),
        }
    }

    fn invalid_url(input: &str, err: &url::ParseError) -> Self {
        Self {
            kind: ApiErrorKind::InvalidUrl,
            status: None,
            message: format!("Invalid URL '{input}': {err}"),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ApiErrorKind {
        self.kind
    }

    /// HTTP status, present only for [`ApiErrorKind::Status`].
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Whether the upstream could not be reached at all.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        self.kind == ApiErrorKind::Transport
    }
}

/// Pick the most useful message out of an error response.
///
/// Order: JSON `message` field, JSON `error` field, raw string body, HTTP
/// status text.
#[must_use]
pub fn extract_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();

    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(serde_json::Value::Object(map)) => {
            for field in ["message", "error"] {
                if let Some(text) = map.get(field).and_then(serde_json::Value::as_str)
                    && !text.trim().is_empty()
                {
                    return text.to_string();
                }
            }
        }
        Ok(serde_json::Value::String(text)) if !text.trim().is_empty() => return text,
        Ok(_) => {}
        Err(_) if !body.is_empty() => return body.to_string(),
        Err(_) => {}
    }

    status
        .canonical_reason()
        .map_or_else(|| status.as_str().to_string(), String::from)
}

/// A resolved upstream base URL, always ending in `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Resolve a base URL: explicit, then configured, then request origin.
    ///
    /// # Errors
    ///
    /// Returns [`ApiErrorKind::InvalidUrl`] if the chosen value does not parse.
    pub fn resolve(
        explicit: Option<&str>,
        configured: Option<&str>,
        origin: &str,
    ) -> Result<Self, ApiError> {
        let chosen = usable_value(explicit)
            .or_else(|| usable_value(configured))
            .unwrap_or(origin);
        Self::parse(chosen)
    }

    /// Parse a base URL and ensure it ends with `/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiErrorKind::InvalidUrl`] if the value does not parse.
    pub fn parse(value: &str) -> Result<Self, ApiError> {
        let trimmed = value.trim();
        let with_slash = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        Url::parse(&with_slash)
            .map(Self)
            .map_err(|e| ApiError::invalid_url(trimmed, &e))
    }

    /// Join a path relative to this base. Leading slashes are ignored so the
    /// base path is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`ApiErrorKind::InvalidUrl`] if the joined URL is invalid.
    pub fn join(&self, path: &str) -> Result<Url, ApiError> {
        let relative = path.trim_start_matches('/');
        self.0
            .join(relative)
            .map_err(|e| ApiError::invalid_url(relative, &e))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// The base without its trailing slash, for messages and redirects.
    #[must_use]
    pub fn display(&self) -> &str {
        self.0.as_str().trim_end_matches('/')
    }
}

/// reqwest client bound to one upstream service.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    configured: Option<String>,
}

impl ApiClient {
    /// Create a client with a fixed timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(configured: Option<String>, timeout: Duration) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::transport(&e))?;

        Ok(Self { http, configured })
    }

    /// Base URL for a request arriving at `origin`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiErrorKind::InvalidUrl`] if no valid base can be built.
    pub fn base_url(&self, origin: &str) -> Result<BaseUrl, ApiError> {
        BaseUrl::resolve(None, self.configured.as_deref(), origin)
    }

    /// Start a request to `path` under the resolved base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ApiErrorKind::InvalidUrl`] if the URL cannot be built.
    pub fn request(
        &self,
        method: Method,
        origin: &str,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.base_url(origin)?.join(path)?;
        let builder = self.http.request(method, url);
        Ok(match bearer {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Send a request and decode a JSON body. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns a transport, status or decode [`ApiError`].
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| ApiError::decode(&e))
    }

    /// Send a request and discard the body.
    ///
    /// # Errors
    ///
    /// Returns a transport or status [`ApiError`].
    pub async fn send_empty(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(drop)
    }

    async fn send(&self, request: RequestBuilder) -> Result<String, ApiError> {
        let response = request.send().await.map_err(|e| ApiError::transport(&e))?;
        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::transport(&e))?;

        if status.is_success() {
            Ok(body)
        } else {
            let err = ApiError::from_status(status, &body);
            tracing::debug!(status = status.as_u16(), error = %err, "Upstream returned an error");
            Err(err)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_prefers_message_field() {
        let body = r#"{"message": "Token expired", "error": "unauthorized"}"#;
        assert_eq!(
            extract_message(StatusCode::UNAUTHORIZED, body),
            "Token expired"
        );
    }

    #[test]
    fn test_extract_message_falls_back_to_error_field() {
        let body = r#"{"error": "Invalid credentials"}"#;
        assert_eq!(
            extract_message(StatusCode::UNAUTHORIZED, body),
            "Invalid credentials"
        );
    }

    #[test]
    fn test_extract_message_raw_body() {
        assert_eq!(
            extract_message(StatusCode::BAD_GATEWAY, "upstream exploded"),
            "upstream exploded"
        );
        assert_eq!(
            extract_message(StatusCode::BAD_REQUEST, r#""quoted text""#),
            "quoted text"
        );
    }

    #[test]
    fn test_extract_message_status_text() {
        assert_eq!(extract_message(StatusCode::NOT_FOUND, ""), "Not Found");
        assert_eq!(
            extract_message(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail": 1}"#),
            "Internal Server Error"
        );
    }

    #[test]
    fn test_base_url_precedence() {
        let base = BaseUrl::resolve(
            Some("http://explicit:1"),
            Some("http://configured:2"),
            "http://origin:3",
        )
        .unwrap();
        assert_eq!(base.as_str(), "http://explicit:1/");

        let base = BaseUrl::resolve(None, Some("http://configured:2"), "http://origin:3").unwrap();
        assert_eq!(base.as_str(), "http://configured:2/");
    }

    #[test]
    fn test_base_url_ignores_placeholder_and_empty() {
        let base =
            BaseUrl::resolve(Some(""), Some("BAKED_SEEKLIT_SERVER_URL"), "http://origin:3").unwrap();
        assert_eq!(base.as_str(), "http://origin:3/");
    }

    #[test]
    fn test_join_keeps_base_path() {
        let base = BaseUrl::parse("http://host/seeklit").unwrap();
        assert_eq!(base.as_str(), "http://host/seeklit/");
        assert_eq!(
            base.join("/api/v1/auth/info").unwrap().as_str(),
            "http://host/seeklit/api/v1/auth/info"
        );
        assert_eq!(base.display(), "http://host/seeklit");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = BaseUrl::parse("not a url").unwrap_err();
        assert_eq!(err.kind(), ApiErrorKind::InvalidUrl);
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_closed_port_is_transport_error() {
        let client = ApiClient::new(Some("http://127.0.0.1:1".to_string()), AUTH_TIMEOUT).unwrap();
        let request = client
            .request(Method::GET, "http://unused", "/api/v1/auth/info", None)
            .unwrap();
        let err = client
            .send_json::<serde_json::Value>(request)
            .await
            .unwrap_err();
        assert!(err.is_transport());
        assert!(err.status().is_none());
    }
}
