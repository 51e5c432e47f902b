//! Health check endpoints.

use axum::{extract::State, http::StatusCode};

use crate::api::ApiErrorKind;
use crate::middleware::RequestContext;
use crate::state::AppState;

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies the Seeklit server answers `/api/v1/auth/info`. Any HTTP
/// response counts as reachable; 503 when no response arrives or the
/// server URL is invalid.
pub async fn readiness(State(state): State<AppState>, ctx: RequestContext) -> StatusCode {
    match state.seeklit().auth_info(ctx.origin()).await {
        Err(err) if err.is_transport() || err.kind() == ApiErrorKind::InvalidUrl => {
            tracing::warn!(error = %err, "Seeklit server unreachable");
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::OK,
    }
}
