//! Issue report proxy.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use seeklit_core::{EditIssue, Issue, IssueId, NewIssue};

use crate::error::Result;
use crate::middleware::{RequestContext, RequireUser};
use crate::state::AppState;

/// `GET /api/issues`
pub async fn list(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
) -> Result<Json<Vec<Issue>>> {
    let issues = state
        .seeklit()
        .list_issues(ctx.origin(), &user.access_token)
        .await?;
    Ok(Json(issues))
}

/// `POST /api/issues`
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
    Json(issue): Json<NewIssue>,
) -> Result<(StatusCode, Json<Issue>)> {
    issue.validate()?;
    let issue = issue.reported_by(&user);

    let created = state
        .seeklit()
        .create_issue(ctx.origin(), &user.access_token, &issue)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PATCH /api/issues/{id}`
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
    Path(id): Path<i64>,
    Json(edit): Json<EditIssue>,
) -> Result<Json<Issue>> {
    let updated = state
        .seeklit()
        .update_issue(ctx.origin(), &user.access_token, IssueId::new(id), &edit)
        .await?;
    Ok(Json(updated))
}

/// `DELETE /api/issues/{id}`
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    ctx: RequestContext,
    Path(id): Path<i64>,
) -> Result<StatusCode> {
    state
        .seeklit()
        .delete_issue(ctx.origin(), &user.access_token, IssueId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
