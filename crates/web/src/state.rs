//! Application state shared across handlers.

use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use crate::api::{ApiError, MediaServerClient, SeeklitClient};
use crate::auth::{AuthResolver, LogoutCoordinator};
use crate::config::WebConfig;
use crate::search::SearchFence;
use crate::session::SessionStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// upstream clients, the session store and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    session: SessionStore,
    seeklit: SeeklitClient,
    media_server: MediaServerClient,
    resolver: AuthResolver,
    logout: LogoutCoordinator,
    search_fence: SearchFence,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn new(config: WebConfig) -> Result<Self, ApiError> {
        let seeklit = SeeklitClient::new(&config.upstream)?;
        let media_server = MediaServerClient::new(config.upstream.media_server_url.clone())?;
        let resolver = AuthResolver::new(seeklit.clone(), media_server.clone());
        let logout = LogoutCoordinator::new(seeklit.clone(), media_server.clone());
        let session = SessionStore::new(config.session.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                session,
                seeklit,
                media_server,
                resolver,
                logout,
                search_fence: SearchFence::new(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Seeklit API server client.
    #[must_use]
    pub fn seeklit(&self) -> &SeeklitClient {
        &self.inner.seeklit
    }

    /// Audiobookshelf client.
    #[must_use]
    pub fn media_server(&self) -> &MediaServerClient {
        &self.inner.media_server
    }

    #[must_use]
    pub fn resolver(&self) -> &AuthResolver {
        &self.inner.resolver
    }

    #[must_use]
    pub fn logout(&self) -> &LogoutCoordinator {
        &self.inner.logout
    }

    #[must_use]
    pub fn search_fence(&self) -> &SearchFence {
        &self.inner.search_fence
    }
}

/// Lets `SignedCookieJar` extract with the session signing key.
impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.session().key().clone()
    }
}
