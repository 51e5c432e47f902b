//! Auth resolution.
//!
//! Turns the inbound request's session into a fully populated [`User`], or
//! a definitive "not signed in". Strategies are tried in order:
//!
//! 1. **Unified identity**: the Seeklit server's session lookup
//!    (`/api/v1/auth/tokens`). Covers OIDC sessions and direct sessions the
//!    server knows about.
//! 2. **Direct credential**: the media server's `/api/me`, only when the
//!    Seeklit server advertises direct sign-in.
//!
//! The first strategy to resolve a user wins. A strategy that cannot reach
//! its upstream at all stops the chain with a [`ServerCommunicationError`]
//! so the login page can tell "not signed in" apart from "misconfigured".

pub mod callback;
pub mod logout;

use core::fmt;

use thiserror::Error;

use seeklit_core::{AuthSource, User};

use crate::api::{ApiError, ApiErrorKind, MediaServerClient, SeeklitClient};
use crate::middleware::RequestContext;

pub use callback::{CallbackOutcome, CallbackParams, CallbackState};
pub use logout::LogoutCoordinator;

/// An upstream whose address comes from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    SeeklitServer,
    MediaServer,
}

impl Upstream {
    /// Environment variable that configures this upstream.
    #[must_use]
    pub const fn env_var(self) -> &'static str {
        match self {
            Self::SeeklitServer => "SEEKLIT_SERVER_URL",
            Self::MediaServer => "SEEKLIT_ABS_URL",
        }
    }
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SeeklitServer => "the Seeklit server",
            Self::MediaServer => "the Audiobookshelf server",
        })
    }
}

/// An upstream could not be reached, so the user's state is unknown.
#[derive(Debug, Clone, Error)]
#[error("Unable to connect to {upstream} at {url}: {message}")]
pub struct ServerCommunicationError {
    pub upstream: Upstream,
    pub url: String,
    pub message: String,
}

impl ServerCommunicationError {
    fn new(upstream: Upstream, url: impl Into<String>, err: &ApiError) -> Self {
        Self {
            upstream,
            url: url.into(),
            message: err.message().to_string(),
        }
    }

    /// What an operator should check.
    #[must_use]
    pub fn hint(&self) -> String {
        format!(
            "Check that {} is set correctly and that {} is running and reachable from this server.",
            self.upstream.env_var(),
            self.upstream
        )
    }
}

/// Whether an upstream failure means the upstream is misconfigured or down.
const fn is_configuration_failure(err: &ApiError) -> bool {
    matches!(err.kind(), ApiErrorKind::Transport | ApiErrorKind::InvalidUrl)
}

/// One way of resolving a session token to a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    UnifiedIdentity,
    DirectCredential,
}

impl AuthStrategy {
    /// Default resolution order.
    pub const CHAIN: [Self; 2] = [Self::UnifiedIdentity, Self::DirectCredential];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::UnifiedIdentity => "unified_identity",
            Self::DirectCredential => "direct_credential",
        }
    }
}

/// Result of a single strategy.
#[derive(Debug)]
pub enum Resolution {
    Resolved(User),
    /// This strategy does not know the session; try the next one.
    NotApplicable,
    /// The strategy's upstream is unreachable; stop resolving.
    ConfigError(ServerCommunicationError),
}

/// Resolves the current user from the session.
#[derive(Debug, Clone)]
pub struct AuthResolver {
    seeklit: SeeklitClient,
    media_server: MediaServerClient,
    strategies: Vec<AuthStrategy>,
}

impl AuthResolver {
    #[must_use]
    pub fn new(seeklit: SeeklitClient, media_server: MediaServerClient) -> Self {
        Self {
            seeklit,
            media_server,
            strategies: AuthStrategy::CHAIN.to_vec(),
        }
    }

    /// Replace the strategy order.
    #[must_use]
    pub fn with_strategies(mut self, strategies: impl Into<Vec<AuthStrategy>>) -> Self {
        self.strategies = strategies.into();
        self
    }

    /// The current user, `None` if not signed in.
    ///
    /// Without a session cookie no upstream is contacted.
    ///
    /// # Errors
    ///
    /// Returns [`ServerCommunicationError`] when an upstream is unreachable.
    pub async fn get_user(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<User>, ServerCommunicationError> {
        let Some(token) = ctx.session_token() else {
            return Ok(None);
        };

        for strategy in &self.strategies {
            match self.run(*strategy, ctx, token).await {
                Resolution::Resolved(user) => {
                    tracing::debug!(
                        strategy = strategy.name(),
                        auth_source = %user.auth_source,
                        username = %user.username,
                        "Resolved user"
                    );
                    return Ok(Some(user));
                }
                Resolution::ConfigError(err) => {
                    tracing::error!(strategy = strategy.name(), error = %err, "Auth upstream unreachable");
                    return Err(err);
                }
                Resolution::NotApplicable => {}
            }
        }

        tracing::debug!("Session did not resolve to a user");
        Ok(None)
    }

    /// The current user's bearer token.
    ///
    /// # Errors
    ///
    /// Returns [`ServerCommunicationError`] when an upstream is unreachable.
    pub async fn get_user_token(
        &self,
        ctx: &RequestContext,
    ) -> Result<Option<String>, ServerCommunicationError> {
        Ok(self.get_user(ctx).await?.map(|user| user.access_token))
    }

    async fn run(&self, strategy: AuthStrategy, ctx: &RequestContext, token: &str) -> Resolution {
        match strategy {
            AuthStrategy::UnifiedIdentity => self.unified_identity(ctx, Some(token)).await,
            AuthStrategy::DirectCredential => self.direct_credential(ctx, token).await,
        }
    }

    /// Ask the Seeklit server who owns the current session.
    ///
    /// Also used to validate a token handed over by the OIDC callback.
    pub async fn unified_identity(&self, ctx: &RequestContext, bearer: Option<&str>) -> Resolution {
        match self
            .seeklit
            .tokens(ctx.origin(), ctx.cookie_header(), bearer)
            .await
        {
            Ok(response) => {
                let auth_source = response.auth_source();
                response
                    .user
                    .and_then(|user| user.into_user(auth_source, AuthSource::Oidc))
                    .map_or(Resolution::NotApplicable, Resolution::Resolved)
            }
            Err(err) if is_configuration_failure(&err) => Resolution::ConfigError(
                ServerCommunicationError::new(
                    Upstream::SeeklitServer,
                    self.seeklit_url(ctx),
                    &err,
                ),
            ),
            Err(err) => {
                tracing::debug!(error = %err, "Unified identity lookup declined");
                Resolution::NotApplicable
            }
        }
    }

    async fn direct_credential(&self, ctx: &RequestContext, token: &str) -> Resolution {
        match self.seeklit.auth_info(ctx.origin()).await {
            Ok(info) if info.direct_enabled() => {}
            Ok(_) => return Resolution::NotApplicable,
            Err(err) => {
                tracing::warn!(error = %err, "Could not load auth info; skipping direct sign-in");
                return Resolution::NotApplicable;
            }
        }

        match self.media_server.me(ctx.origin(), token).await {
            Ok(user) => user
                .into_user(Some(AuthSource::Direct), AuthSource::Direct)
                .map_or(Resolution::NotApplicable, Resolution::Resolved),
            Err(err) if is_configuration_failure(&err) => {
                let url = self
                    .media_server
                    .base_url(ctx.origin())
                    .map_or_else(|_| ctx.origin().to_string(), |base| base.display().to_string());
                Resolution::ConfigError(ServerCommunicationError::new(
                    Upstream::MediaServer,
                    url,
                    &err,
                ))
            }
            Err(err) => {
                tracing::debug!(error = %err, "Media server rejected session token");
                Resolution::NotApplicable
            }
        }
    }

    fn seeklit_url(&self, ctx: &RequestContext) -> String {
        self.seeklit
            .base_url(ctx.origin())
            .map_or_else(|_| ctx.origin().to_string(), |base| base.display().to_string())
    }
}
