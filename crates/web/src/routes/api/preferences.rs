//! User notification preferences and email verification.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::middleware::{RequestContext, RequireUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub code: Option<String>,
}

/// `GET /api/preferences`
pub async fn get(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
) -> Result<Json<Value>> {
    let preferences = state
        .seeklit()
        .preferences(ctx.origin(), &user.access_token)
        .await?;
    Ok(Json(preferences))
}

/// `PUT /api/preferences`: partial updates are accepted.
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
    Json(preferences): Json<Value>,
) -> Result<Json<Value>> {
    if !preferences.is_object() {
        return Err(AppError::BadRequest("Preferences must be a JSON object".to_string()));
    }

    let updated = state
        .seeklit()
        .update_preferences(ctx.origin(), &user.access_token, &preferences)
        .await?;
    Ok(Json(updated))
}

/// `POST /api/preferences/verify-email`: send a verification code.
pub async fn send_verification(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
) -> Result<Json<Value>> {
    let response = state
        .seeklit()
        .send_email_verification(ctx.origin(), &user.access_token)
        .await?;
    Ok(Json(response))
}

/// `GET /api/preferences/verify-email?code=`
pub async fn verify(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<Value>> {
    let code = query
        .code
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("A verification code is required".to_string()))?;

    let response = state
        .seeklit()
        .verify_email(ctx.origin(), &user.access_token, code)
        .await?;
    Ok(Json(response))
}
