//! Authentication route handlers.
//!
//! Handles the login page, direct (media server) sign-in, the OIDC hand-off
//! and callback, and browser-side session creation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::SignedCookieJar;
use serde::Deserialize;

use seeklit_core::{AuthInfo, AuthSource, friendly_auth_error};

use crate::auth::{CallbackOutcome, CallbackParams, ServerCommunicationError, callback};
use crate::error::{AppError, Result, add_breadcrumb, set_sentry_user};
use crate::middleware::RequestContext;
use crate::state::AppState;

/// Shown for any failed direct sign-in.
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed. Please check your credentials.";

// =============================================================================
// Form Types
// =============================================================================

/// Direct sign-in form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /auth/session`.
#[derive(Debug, Default, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub token: Option<String>,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for error display.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub error: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Upstream configuration problem shown instead of the sign-in options.
pub struct ConfigErrorView {
    pub message: String,
    pub hint: String,
    pub request_id: Option<String>,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    /// OIDC button label; `None` when OIDC is disabled.
    pub oidc_label: Option<String>,
    pub direct_enabled: bool,
    pub error: Option<String>,
    pub config_error: Option<ConfigErrorView>,
    pub username: String,
}

impl LoginTemplate {
    fn new(info: &AuthInfo, error: Option<String>) -> Self {
        Self {
            oidc_label: info.oidc_enabled().then(|| info.oidc_button_label()),
            direct_enabled: info.direct_enabled(),
            error,
            config_error: None,
            username: String::new(),
        }
    }

    fn config_error(err: &ServerCommunicationError, ctx: &RequestContext) -> Self {
        Self {
            config_error: Some(ConfigErrorView {
                message: err.to_string(),
                hint: err.hint(),
                request_id: ctx.request_id().map(String::from),
            }),
            ..Self::new(&AuthInfo::oidc_only(), None)
        }
    }
}

/// OIDC callback page, used when the session must be finished in the browser.
#[derive(Template, WebTemplate)]
#[template(path = "auth/callback.html")]
pub struct CallbackTemplate {
    /// Seeklit server token endpoint as reachable from the browser.
    pub tokens_url: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
///
/// Signed-in users go home. With OIDC auto-redirect enabled (and no error to
/// show) the user is sent straight to the provider.
pub async fn login_page(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(query): Query<LoginQuery>,
) -> Response {
    match state.resolver().get_user(&ctx).await {
        Ok(Some(_)) => return Redirect::to("/").into_response(),
        Ok(None) => {}
        Err(err) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                LoginTemplate::config_error(&err, &ctx),
            )
                .into_response();
        }
    }

    let info = load_auth_info(&state, &ctx).await;
    let error = query
        .error
        .filter(|e| !e.is_empty())
        .map(|e| friendly_auth_error(&e).into_owned());

    if error.is_none() && info.should_auto_redirect() {
        return Redirect::to("/auth/oidc/login").into_response();
    }

    LoginTemplate::new(&info, error).into_response()
}

/// Handle direct sign-in against the media server.
pub async fn login(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: SignedCookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        let mut page = LoginTemplate::new(
            &load_auth_info(&state, &ctx).await,
            Some("Please enter your username and password.".to_string()),
        );
        page.username = username.to_string();
        return (StatusCode::BAD_REQUEST, page).into_response();
    }

    let user = match state
        .media_server()
        .login(ctx.origin(), username, &form.password)
        .await
    {
        Ok(response) => response
            .user
            .and_then(|user| user.into_user(Some(AuthSource::Direct), AuthSource::Direct)),
        Err(err) => {
            tracing::warn!(error = %err, "Direct sign-in failed");
            None
        }
    };

    let Some(user) = user else {
        let mut page = LoginTemplate::new(
            &load_auth_info(&state, &ctx).await,
            Some(LOGIN_FAILED_MESSAGE.to_string()),
        );
        page.username = username.to_string();
        return (StatusCode::UNAUTHORIZED, page).into_response();
    };

    tracing::info!(username = %user.username, auth_source = %user.auth_source, "User signed in");
    set_sentry_user(&user.id, &user.username, user.email.as_deref());
    add_breadcrumb("auth", "Signed in", Some(&[("auth_source", "direct")]));

    let jar = state.session().create(jar, &user.access_token);
    (jar, Redirect::to("/")).into_response()
}

/// Send the browser to the Seeklit server to start the OIDC flow.
pub async fn oidc_login(State(state): State<AppState>, ctx: RequestContext) -> Result<Redirect> {
    let url = state.seeklit().oidc_login_url(ctx.origin())?;
    Ok(Redirect::to(url.as_str()))
}

/// Finish an OIDC sign-in.
pub async fn oidc_callback(
    State(state): State<AppState>,
    ctx: RequestContext,
    jar: SignedCookieJar,
    Query(params): Query<CallbackParams>,
) -> Result<Response> {
    let outcome = callback::process(state.resolver(), state.seeklit(), &ctx, &params).await;
    tracing::debug!(state = ?outcome.state(), "OIDC callback processed");

    Ok(match outcome {
        CallbackOutcome::ServerValidated { token } => {
            add_breadcrumb("auth", "Signed in", Some(&[("auth_source", "oidc")]));
            let jar = state.session().create(jar, &token);
            (jar, Redirect::to("/")).into_response()
        }
        CallbackOutcome::Failed { message } => login_error_redirect(&message).into_response(),
        CallbackOutcome::ClientPolling => CallbackTemplate {
            tokens_url: state.seeklit().tokens_url(ctx.origin())?.to_string(),
        }
        .into_response(),
    })
}

/// Store a token obtained by the browser as the session.
pub async fn create_session(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Json(body): Json<SessionRequest>,
) -> Result<Response> {
    let token = body
        .token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::BadRequest("Token is required".to_string()))?;

    tracing::info!("Session created from browser callback");
    let jar = state.session().create(jar, token);
    Ok((jar, Json(serde_json::json!({ "success": true }))).into_response())
}

// =============================================================================
// Helpers
// =============================================================================

/// Enabled sign-in methods, falling back to OIDC-only when the server can't say.
async fn load_auth_info(state: &AppState, ctx: &RequestContext) -> AuthInfo {
    state
        .seeklit()
        .auth_info(ctx.origin())
        .await
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Failed to load auth info; assuming OIDC only");
            AuthInfo::oidc_only()
        })
}

/// Redirect to the login page with an error message.
#[must_use]
pub fn login_error_redirect(message: &str) -> Redirect {
    Redirect::to(&format!("/auth?error={}", urlencoding::encode(message)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_error_redirect_encodes_message() {
        let response = login_error_redirect("Invalid state parameter").into_response();
        let location = response.headers().get("location").and_then(|v| v.to_str().ok());
        assert_eq!(location, Some("/auth?error=Invalid%20state%20parameter"));
    }

    #[test]
    fn test_login_template_hides_disabled_methods() {
        let page = LoginTemplate::new(&AuthInfo::oidc_only(), None);
        assert_eq!(page.oidc_label.as_deref(), Some("Sign in with OIDC"));
        assert!(!page.direct_enabled);

        let html = page.render().unwrap_or_default();
        assert!(html.contains("Sign in with OIDC"));
        assert!(!html.contains("name=\"password\""));
    }
}
