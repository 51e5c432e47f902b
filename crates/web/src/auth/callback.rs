//! OIDC callback processing.
//!
//! The Seeklit server completes the authorization code exchange and then
//! redirects the browser to `/auth/callback?success=true` (optionally with a
//! `token`). From there the session is materialized server-side when
//! possible, otherwise the browser finishes the job:
//!
//! ```text
//! Received ─┬─> ServerValidated              (cookie set, redirect /)
//!           ├─> ClientPolling ─> ClientValidated | Failed
//!           └─> Failed                       (redirect /auth?error=...)
//! ```
//!
//! A URL token that cannot be checked because the Seeklit server is
//! unreachable fails immediately with the configuration hint.

use serde::Deserialize;

use crate::api::SeeklitClient;
use crate::middleware::RequestContext;

use super::{AuthResolver, Resolution};

/// Shown when the provider redirect lacks `success=true`.
pub const MISSING_SUCCESS_MESSAGE: &str = "Invalid callback - missing success parameter";

/// Query string of `/auth/callback`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    #[serde(default)]
    pub success: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Where a callback ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackState {
    Received,
    ServerValidated,
    ClientPolling,
    /// Reached in the browser once `/auth/session` accepts the token.
    ClientValidated,
    Failed,
}

/// Server-side result of a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// Store `token` as the session and go home.
    ServerValidated { token: String },
    /// Let the browser retrieve the token from its server session.
    ClientPolling,
    /// Send the user back to the login page with `message`.
    Failed { message: String },
}

impl CallbackOutcome {
    #[must_use]
    pub const fn state(&self) -> CallbackState {
        match self {
            Self::ServerValidated { .. } => CallbackState::ServerValidated,
            Self::ClientPolling => CallbackState::ClientPolling,
            Self::Failed { .. } => CallbackState::Failed,
        }
    }
}

/// Decide how to finish an OIDC callback.
///
/// An `error` parameter short-circuits before any upstream call.
pub async fn process(
    resolver: &AuthResolver,
    seeklit: &SeeklitClient,
    ctx: &RequestContext,
    params: &CallbackParams,
) -> CallbackOutcome {
    if let Some(error) = params.error.as_deref().filter(|e| !e.is_empty()) {
        tracing::warn!(error, "OIDC callback returned an error");
        return CallbackOutcome::Failed {
            message: error.to_string(),
        };
    }

    if params.success.as_deref() != Some("true") {
        tracing::warn!("OIDC callback without success parameter");
        return CallbackOutcome::Failed {
            message: MISSING_SUCCESS_MESSAGE.to_string(),
        };
    }

    if let Some(token) = params.token.as_deref().filter(|t| !t.trim().is_empty()) {
        match resolver.unified_identity(ctx, Some(token)).await {
            Resolution::Resolved(user) => {
                tracing::info!(username = %user.username, "Session created from callback token");
                return CallbackOutcome::ServerValidated {
                    token: token.to_string(),
                };
            }
            Resolution::NotApplicable => {
                tracing::warn!("Callback token was not accepted; trying server session");
            }
            Resolution::ConfigError(err) => {
                tracing::error!(error = %err, "Could not validate callback token");
                return CallbackOutcome::Failed {
                    message: format!("{err}. {}", err.hint()),
                };
            }
        }
    }

    match seeklit
        .tokens(ctx.origin(), ctx.cookie_header(), None)
        .await
    {
        Ok(response) if response.user.is_some() => {
            if let Some(token) = response.session_token() {
                tracing::info!("Session created from server session");
                return CallbackOutcome::ServerValidated {
                    token: token.to_string(),
                };
            }
            tracing::debug!("Server session has no usable token");
        }
        Ok(_) => tracing::debug!("Server session lookup returned no user"),
        Err(err) => tracing::debug!(error = %err, "Server session lookup failed"),
    }

    CallbackOutcome::ClientPolling
}
