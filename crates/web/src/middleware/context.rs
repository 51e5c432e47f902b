//! Per-request inputs to auth resolution.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::SignedCookieJar;

use super::request_id::RequestId;
use crate::state::AppState;

/// Everything upstream calls need to know about the inbound request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    origin: String,
    cookie_header: Option<String>,
    session_token: Option<String>,
    request_id: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn new(
        origin: impl Into<String>,
        cookie_header: Option<String>,
        session_token: Option<String>,
    ) -> Self {
        Self {
            origin: origin.into(),
            cookie_header,
            session_token,
            request_id: None,
        }
    }

    /// Scheme and host the browser used, e.g. `https://books.example.org`.
    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// The raw inbound `Cookie` header, forwarded to the Seeklit server.
    #[must_use]
    pub fn cookie_header(&self) -> Option<&str> {
        self.cookie_header.as_deref()
    }

    /// Token from a validly signed session cookie.
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }

    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let jar = SignedCookieJar::from_headers(&parts.headers, state.session().key().clone());

        Ok(Self {
            origin: request_origin(&parts.headers),
            cookie_header: cookie_header(&parts.headers),
            session_token: state.session().token(&jar),
            request_id: parts.extensions.get::<RequestId>().map(|id| id.0.clone()),
        })
    }
}

/// Origin of the request, honouring reverse proxy headers.
#[must_use]
pub fn request_origin(headers: &HeaderMap) -> String {
    let first = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let scheme = first("x-forwarded-proto").unwrap_or("http");
    let host = first("x-forwarded-host")
        .or_else(|| first(header::HOST.as_str()))
        .unwrap_or("localhost");
    format!("{scheme}://{host}")
}

/// All `Cookie` headers joined into one.
fn cookie_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect();
    (!values.is_empty()).then(|| values.join("; "))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn test_new_accepts_borrowed_origin() {
        let ctx = RequestContext::new("http://localhost:3000", None, Some("tok".to_string()));
        assert_eq!(ctx.origin(), "http://localhost:3000");
        assert_eq!(ctx.session_token(), Some("tok"));
        assert!(ctx.request_id().is_none());
    }

    #[test]
    fn test_origin_from_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:3000"));
        assert_eq!(request_origin(&headers), "http://localhost:3000");
    }

    #[test]
    fn test_origin_behind_proxy() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("seeklit-web:3000"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https, http"));
        headers.insert("x-forwarded-host", HeaderValue::from_static("books.example.org"));
        assert_eq!(request_origin(&headers), "https://books.example.org");
    }

    #[test]
    fn test_cookie_headers_are_joined() {
        let mut headers = HeaderMap::new();
        assert!(cookie_header(&headers).is_none());
        headers.append(header::COOKIE, HeaderValue::from_static("a=1"));
        headers.append(header::COOKIE, HeaderValue::from_static("b=2"));
        assert_eq!(cookie_header(&headers).unwrap(), "a=1; b=2");
    }
}
