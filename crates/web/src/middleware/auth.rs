//! Authentication extractors.
//!
//! Every protected page and API route resolves the current user through
//! these extractors, which run the auth resolver against the session cookie.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};

use seeklit_core::User;

use super::RequestContext;
use crate::auth::ServerCommunicationError;
use crate::error::{AppError, set_sentry_user};
use crate::state::AppState;

/// Extractor that requires a signed-in user.
///
/// Pages redirect to `/auth`; `/api/` routes get a JSON 401.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.display_name())
/// }
/// ```
pub struct RequireUser(pub User);

/// Extractor that requires a root or admin user.
pub struct RequireAdmin(pub User);

/// Error returned when the current user cannot be established.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Signed in but not allowed.
    Forbidden,
    /// An upstream is unreachable (API requests only; pages go to `/auth`,
    /// which renders the configuration error).
    ServerCommunication(ServerCommunicationError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth").into_response(),
            Self::Unauthorized => {
                AppError::Unauthorized("Authentication required".to_string()).into_response()
            }
            Self::Forbidden => {
                AppError::Forbidden("Admin access required".to_string()).into_response()
            }
            Self::ServerCommunication(err) => AppError::ServerCommunication(err).into_response(),
        }
    }
}

/// Whether the request targets the JSON API.
///
/// Nested routers see a path with their prefix stripped, so the original URI
/// is checked first.
fn is_api_request(parts: &Parts) -> bool {
    parts
        .extensions
        .get::<OriginalUri>()
        .map_or(&parts.uri, |original| &original.0)
        .path()
        .starts_with("/api/")
}

async fn resolve(parts: &mut Parts, state: &AppState) -> Result<User, AuthRejection> {
    let is_api = is_api_request(parts);
    let Ok(ctx) = RequestContext::from_request_parts(parts, state).await;

    match state.resolver().get_user(&ctx).await {
        Ok(Some(user)) => {
            set_sentry_user(&user.id, &user.username, user.email.as_deref());
            Ok(user)
        }
        Ok(None) if is_api => Err(AuthRejection::Unauthorized),
        Ok(None) => Err(AuthRejection::RedirectToLogin),
        Err(err) if is_api => Err(AuthRejection::ServerCommunication(err)),
        Err(_) => Err(AuthRejection::RedirectToLogin),
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(parts, state).await.map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve(parts, state).await?;
        if user.role.is_admin() {
            Ok(Self(user))
        } else {
            tracing::warn!(username = %user.username, role = user.role.as_str(), "Admin route denied");
            Err(AuthRejection::Forbidden)
        }
    }
}
