//! Seeklit API server client.

use reqwest::Method;
use reqwest::header::COOKIE;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use seeklit_core::{
    AuthInfo, AuthSource, BookRequest, BookRequestId, EditBookRequest, EditIssue, Issue, IssueId,
    MetadataProvider, NewBookRequest, NewIssue, ServerConfigUpdate, ServerSettings, WireUser,
};

use super::{API_TIMEOUT, AUTH_TIMEOUT, ApiClient, ApiError, BaseUrl};
use crate::config::UpstreamConfig;

/// Body of `GET /api/v1/auth/tokens`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokensResponse {
    #[serde(default)]
    pub user: Option<WireUser>,
    /// Top-level copy of `user.auth_source`.
    #[serde(default)]
    pub auth_source: Option<String>,
    /// Server session token, in the media server's login format.
    #[serde(default)]
    pub cookie: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

impl TokensResponse {
    /// Auth source tag: the user's own, then the top-level field.
    #[must_use]
    pub fn auth_source(&self) -> Option<AuthSource> {
        self.user
            .as_ref()
            .and_then(WireUser::auth_source)
            .or_else(|| self.auth_source.as_deref().and_then(AuthSource::parse))
    }

    /// Token to store in the browser session.
    ///
    /// Prefers `cookie`, then `id_token`, then the user's normalized token.
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        [self.cookie.as_deref(), self.id_token.as_deref()]
            .into_iter()
            .flatten()
            .find(|t| !t.trim().is_empty())
            .or_else(|| self.user.as_ref().and_then(WireUser::normalized_token))
    }
}

/// Client for the Seeklit REST API (`/api/v1`).
#[derive(Debug, Clone)]
pub struct SeeklitClient {
    auth: ApiClient,
    api: ApiClient,
    public_url: Option<String>,
}

impl SeeklitClient {
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to build.
    pub fn new(upstream: &UpstreamConfig) -> Result<Self, ApiError> {
        Ok(Self {
            auth: ApiClient::new(upstream.server_url.clone(), AUTH_TIMEOUT)?,
            api: ApiClient::new(upstream.server_url.clone(), API_TIMEOUT)?,
            public_url: upstream.public_server_url.clone(),
        })
    }

    /// Base URL used for server-side calls.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is invalid.
    pub fn base_url(&self, origin: &str) -> Result<BaseUrl, ApiError> {
        self.auth.base_url(origin)
    }

    /// Base URL as seen by the browser. Same-origin unless configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL is invalid.
    pub fn public_base_url(&self, origin: &str) -> Result<BaseUrl, ApiError> {
        BaseUrl::resolve(self.public_url.as_deref(), None, origin)
    }

    /// Where the browser starts the OIDC flow.
    ///
    /// # Errors
    ///
    /// Returns an error if the public URL is invalid.
    pub fn oidc_login_url(&self, origin: &str) -> Result<Url, ApiError> {
        self.public_base_url(origin)?.join("api/v1/auth/login")
    }

    /// Where the browser retrieves tokens from its server session.
    ///
    /// # Errors
    ///
    /// Returns an error if the public URL is invalid.
    pub fn tokens_url(&self, origin: &str) -> Result<Url, ApiError> {
        self.public_base_url(origin)?.join("api/v1/auth/tokens")
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Look up the current server session.
    ///
    /// Forwards the browser's cookies and, when given, a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn tokens(
        &self,
        origin: &str,
        cookie_header: Option<&str>,
        bearer: Option<&str>,
    ) -> Result<TokensResponse, ApiError> {
        let mut request = self
            .auth
            .request(Method::GET, origin, "api/v1/auth/tokens", bearer)?;
        if let Some(cookies) = cookie_header {
            request = request.header(COOKIE, cookies);
        }
        let response: Option<TokensResponse> = self.auth.send_json(request).await?;
        Ok(response.unwrap_or_default())
    }

    /// Which authentication methods are enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn auth_info(&self, origin: &str) -> Result<AuthInfo, ApiError> {
        let request = self
            .auth
            .request(Method::GET, origin, "api/v1/auth/info", None)?;
        self.auth.send_json(request).await
    }

    /// End the server session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn logout(
        &self,
        origin: &str,
        cookie_header: Option<&str>,
        bearer: Option<&str>,
    ) -> Result<(), ApiError> {
        let mut request = self
            .auth
            .request(Method::POST, origin, "api/v1/auth/logout", bearer)?;
        if let Some(cookies) = cookie_header {
            request = request.header(COOKIE, cookies);
        }
        self.auth.send_empty(request).await
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Search a metadata provider. Results are provider specific and passed through.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn search(
        &self,
        origin: &str,
        token: &str,
        provider: MetadataProvider,
        query: &str,
    ) -> Result<Value, ApiError> {
        let path = format!("api/v1/search/{}", provider.path_segment());
        let request = self
            .api
            .request(Method::POST, origin, &path, Some(token))?
            .json(&serde_json::json!({ "query": query }));
        self.api.send_json(request).await
    }

    /// Books recently added to the library.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn personalized(&self, origin: &str, token: &str) -> Result<Value, ApiError> {
        let request = self
            .api
            .request(Method::GET, origin, "api/v1/search/personalized", Some(token))?;
        self.api.send_json(request).await
    }

    // =========================================================================
    // Book requests
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn list_requests(
        &self,
        origin: &str,
        token: &str,
    ) -> Result<Vec<BookRequest>, ApiError> {
        let request = self
            .api
            .request(Method::GET, origin, "api/v1/requests/", Some(token))?;
        let requests: Option<Vec<BookRequest>> = self.api.send_json(request).await?;
        Ok(requests.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn create_request(
        &self,
        origin: &str,
        token: &str,
        new_request: &NewBookRequest,
    ) -> Result<BookRequest, ApiError> {
        let request = self
            .api
            .request(Method::POST, origin, "api/v1/requests/", Some(token))?
            .json(new_request);
        self.api.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn update_request(
        &self,
        origin: &str,
        token: &str,
        id: BookRequestId,
        edit: &EditBookRequest,
    ) -> Result<BookRequest, ApiError> {
        let path = format!("api/v1/requests/{id}");
        let request = self
            .api
            .request(Method::PATCH, origin, &path, Some(token))?
            .json(edit);
        self.api.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_request(
        &self,
        origin: &str,
        token: &str,
        id: BookRequestId,
    ) -> Result<(), ApiError> {
        let path = format!("api/v1/requests/{id}");
        let request = self
            .api
            .request(Method::DELETE, origin, &path, Some(token))?;
        self.api.send_empty(request).await
    }

    // =========================================================================
    // Issues
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn list_issues(&self, origin: &str, token: &str) -> Result<Vec<Issue>, ApiError> {
        let request = self
            .api
            .request(Method::GET, origin, "api/v1/issues/", Some(token))?;
        let issues: Option<Vec<Issue>> = self.api.send_json(request).await?;
        Ok(issues.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn create_issue(
        &self,
        origin: &str,
        token: &str,
        issue: &NewIssue,
    ) -> Result<Issue, ApiError> {
        let request = self
            .api
            .request(Method::POST, origin, "api/v1/issues/", Some(token))?
            .json(issue);
        self.api.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn update_issue(
        &self,
        origin: &str,
        token: &str,
        id: IssueId,
        edit: &EditIssue,
    ) -> Result<Issue, ApiError> {
        let path = format!("api/v1/issues/{id}");
        let request = self
            .api
            .request(Method::PATCH, origin, &path, Some(token))?
            .json(edit);
        self.api.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_issue(&self, origin: &str, token: &str, id: IssueId) -> Result<(), ApiError> {
        let path = format!("api/v1/issues/{id}");
        let request = self
            .api
            .request(Method::DELETE, origin, &path, Some(token))?;
        self.api.send_empty(request).await
    }

    // =========================================================================
    // Settings & preferences
    // =========================================================================

    /// Public server settings. No token required.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn settings(&self, origin: &str) -> Result<ServerSettings, ApiError> {
        let request = self
            .api
            .request(Method::GET, origin, "api/v1/settings", None)?;
        self.api.send_json(request).await
    }

    /// Full server configuration (admin only upstream as well).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn server_config(&self, origin: &str, token: &str) -> Result<Value, ApiError> {
        let request = self
            .api
            .request(Method::GET, origin, "api/v1/settings/config", Some(token))?;
        self.api.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_server_config(
        &self,
        origin: &str,
        token: &str,
        update: &ServerConfigUpdate,
    ) -> Result<Value, ApiError> {
        let request = self
            .api
            .request(Method::PATCH, origin, "api/v1/settings/config", Some(token))?
            .json(update);
        self.api.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn preferences(&self, origin: &str, token: &str) -> Result<Value, ApiError> {
        let request = self
            .api
            .request(Method::GET, origin, "api/v1/user/preferences", Some(token))?;
        self.api.send_json(request).await
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_preferences(
        &self,
        origin: &str,
        token: &str,
        preferences: &Value,
    ) -> Result<Value, ApiError> {
        let request = self
            .api
            .request(Method::PUT, origin, "api/v1/user/preferences", Some(token))?
            .json(preferences);
        self.api.send_json(request).await
    }

    /// Ask the server to email a verification code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn send_email_verification(
        &self,
        origin: &str,
        token: &str,
    ) -> Result<Value, ApiError> {
        let request = self
            .api
            .request(
                Method::POST,
                origin,
                "api/v1/user/preferences/verify-email",
                Some(token),
            )?
            .json(&serde_json::json!({}));
        self.api.send_json(request).await
    }

    /// Confirm an email verification code.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn verify_email(&self, origin: &str, token: &str, code: &str) -> Result<Value, ApiError> {
        let request = self
            .api
            .request(
                Method::GET,
                origin,
                "api/v1/user/preferences/verify-email",
                Some(token),
            )?
            .query(&[("code", code)]);
        self.api.send_json(request).await
    }
}
