//! Search proxy with stale-response fencing.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use seeklit_core::MetadataProvider;

use crate::error::{AppError, Result};
use crate::middleware::{RequestContext, RequireUser};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub query: String,
}

/// Results are provider specific and forwarded unchanged.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub seq: u64,
    pub results: Value,
}

/// `POST /api/search/{provider}`
///
/// Answers 409 with `{"stale": true, "seq": n}` when a newer search from the
/// same session and provider was started while this one was in flight.
pub async fn search(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
    Path(provider): Path<String>,
    Json(body): Json<SearchBody>,
) -> Result<Response> {
    let provider: MetadataProvider = provider.parse()?;
    let query = body.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest("A search query is required".to_string()));
    }

    let fence = state.search_fence();
    let seq = fence.begin(&user.access_token, provider).await;
    let results = state
        .seeklit()
        .search(ctx.origin(), &user.access_token, provider, query)
        .await;

    if !fence.is_current(&user.access_token, provider, seq).await {
        tracing::debug!(seq, %provider, "Dropping superseded search response");
        return Ok((
            StatusCode::CONFLICT,
            Json(serde_json::json!({ "stale": true, "seq": seq })),
        )
            .into_response());
    }

    Ok(Json(SearchResponse {
        seq,
        results: results?,
    })
    .into_response())
}

/// `GET /api/search/personalized`: books recently added to the library.
pub async fn personalized(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
) -> Result<Json<Value>> {
    let books = state
        .seeklit()
        .personalized(ctx.origin(), &user.access_token)
        .await?;
    Ok(Json(books))
}
