//! Audiobookshelf media server client.
//!
//! Used for direct username/password sign-in, for resolving users whose
//! session token was issued by the media server, and for the admin user list.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use seeklit_core::WireUser;

use super::{ApiClient, ApiError, BaseUrl, MEDIA_SERVER_TIMEOUT};

/// Body of `POST /login`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub user: Option<WireUser>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    username: &'a str,
    password: &'a str,
}

/// Client for the Audiobookshelf API.
#[derive(Debug, Clone)]
pub struct MediaServerClient {
    client: ApiClient,
}

impl MediaServerClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(media_server_url: Option<String>) -> Result<Self, ApiError> {
        Ok(Self {
            client: ApiClient::new(media_server_url, MEDIA_SERVER_TIMEOUT)?,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the configured URL is invalid.
    pub fn base_url(&self, origin: &str) -> Result<BaseUrl, ApiError> {
        self.client.base_url(origin)
    }

    /// Sign in with username and password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn login(
        &self,
        origin: &str,
        username: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        let request = self
            .client
            .request(Method::POST, origin, "login", None)?
            .json(&Credentials { username, password });
        let response: Option<LoginResponse> = self.client.send_json(request).await?;
        Ok(response.unwrap_or_default())
    }

    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn logout(&self, origin: &str, token: &str) -> Result<(), ApiError> {
        let request = self
            .client
            .request(Method::POST, origin, "logout", Some(token))?;
        self.client.send_empty(request).await
    }

    /// The user owning `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body does not decode.
    pub async fn me(&self, origin: &str, token: &str) -> Result<WireUser, ApiError> {
        let request = self
            .client
            .request(Method::GET, origin, "api/me", Some(token))?;
        self.client.send_json(request).await
    }

    /// All media server users (admin token required upstream).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn users(&self, origin: &str, token: &str) -> Result<Value, ApiError> {
        let request = self
            .client
            .request(Method::GET, origin, "api/users", Some(token))?;
        self.client.send_json(request).await
    }
}
