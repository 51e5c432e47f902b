//! Book request proxy.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use seeklit_core::{BookRequest, BookRequestId, EditBookRequest, NewBookRequest};

use crate::error::Result;
use crate::middleware::{RequestContext, RequireUser};
use crate::state::AppState;

/// `GET /api/requests`
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
) -> Result<Json<Vec<BookRequest>>> {
    let requests = state
        .seeklit()
        .list_requests(ctx.origin(), &user.access_token)
        .await?;
    Ok(Json(requests))
}

/// `POST /api/requests`
///
/// Validated before anything is sent upstream; the requestor is always the
/// signed-in user regardless of what the body says.
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
    Json(new_request): Json<NewBookRequest>,
) -> Result<(StatusCode, Json<BookRequest>)> {
    new_request.validate()?;
    let new_request = new_request.requested_by(&user);

    let created = state
        .seeklit()
        .create_request(ctx.origin(), &user.access_token, &new_request)
        .await?;
    tracing::info!(request_id = %created.id, title = %created.title, "Book requested");
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /api/requests/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(edit): Json<EditBookRequest>,
) -> Result<Json<BookRequest>> {
    let updated = state
        .seeklit()
        .update_request(ctx.origin(), &user.access_token, BookRequestId::new(id), &edit)
        .await?;
    Ok(Json(updated))
}

/// `DELETE /api/requests/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state
        .seeklit()
        .delete_request(ctx.origin(), &user.access_token, BookRequestId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
