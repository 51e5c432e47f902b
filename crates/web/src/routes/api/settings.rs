//! Server settings and configuration.

use axum::{Json, extract::State};
use serde_json::Value;

use seeklit_core::{ServerConfigUpdate, ServerSettings};

use crate::error::{AppError, Result};
use crate::middleware::{RequestContext, RequireAdmin};
use crate::state::AppState;

/// `GET /api/settings`: public, no sign-in required.
pub async fn public(State(state): State<AppState>, ctx: RequestContext) -> Result<Json<ServerSettings>> {
    Ok(Json(state.seeklit().settings(ctx.origin()).await?))
}

/// `GET /api/settings/config`: root and admin only.
pub async fn config(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ctx: RequestContext,
) -> Result<Json<Value>> {
    let config = state
        .seeklit()
        .server_config(ctx.origin(), &user.access_token)
        .await?;
    Ok(Json(config))
}

/// `PATCH /api/settings/config`: root and admin only.
pub async fn update_config(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ctx: RequestContext,
    Json(update): Json<ServerConfigUpdate>,
) -> Result<Json<Value>> {
    if update.key.trim().is_empty() {
        return Err(AppError::BadRequest("A configuration key is required".to_string()));
    }

    let config = state
        .seeklit()
        .update_server_config(ctx.origin(), &user.access_token, &update)
        .await?;
    tracing::info!(key = %update.key, username = %user.username, "Server configuration updated");
    Ok(Json(config))
}
