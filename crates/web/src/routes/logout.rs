//! Logout route handler.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::SignedCookieJar;

use crate::error::{add_breadcrumb, clear_sentry_user};
use crate::middleware::RequestContext;
use crate::state::AppState;

/// Revoke upstream sessions, clear the session cookie and return to `/auth`.
///
/// Served for both GET and POST. Upstream failures never block the redirect.
pub async fn logout(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: SignedCookieJar,
) -> impl IntoResponse {
    let attempts = state.logout().logout(&ctx).await;
    tracing::debug!(?attempts, "Upstream sessions revoked");

    add_breadcrumb("auth", "Signed out", None);
    clear_sentry_user();

    (state.session().destroy(jar), Redirect::to("/auth"))
}
