//! Media server user listing.

use axum::{Json, extract::State};
use serde_json::Value;

use crate::error::Result;
use crate::middleware::{RequestContext, RequireAdmin};
use crate::state::AppState;

/// `GET /api/users`: Audiobookshelf accounts, root and admin only.
///
/// The media server only honours its own tokens, so this works for users
/// who signed in directly.
pub async fn list(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    ctx: RequestContext,
) -> Result<Json<Value>> {
    let users = state
        .media_server()
        .users(ctx.origin(), &user.access_token)
        .await?;
    Ok(Json(users))
}
