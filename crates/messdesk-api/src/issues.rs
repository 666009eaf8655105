use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use messdesk_core::issues;
use messdesk_types::api::{CreateIssueRequest, IssuePatch};
use messdesk_types::models::Principal;

use crate::auth::AppState;
use crate::error::ApiResult;

pub async fn create_issue(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateIssueRequest>,
) -> ApiResult<impl IntoResponse> {
    let issue = crate::blocking(move || issues::create(&state.db, &principal, req)).await?;
    Ok((StatusCode::CREATED, Json(issue)))
}

pub async fn update_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(patch): Json<IssuePatch>,
) -> ApiResult<impl IntoResponse> {
    let issue = crate::blocking(move || {
        issues::update(&state.db, &state.files, &principal, issue_id, patch)
    })
    .await?;
    Ok(Json(issue))
}

pub async fn delete_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    crate::blocking(move || issues::delete(&state.db, &state.files, &principal, issue_id)).await?;
    Ok(Json(serde_json::json!({ "message": "Issue deleted successfully" })))
}

/// Community view: every authenticated caller sees all issues, most
/// upvoted first.
pub async fn list_issues(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    let all = crate::blocking(move || issues::list_all(&state.db)).await?;
    Ok(Json(all))
}

pub async fn get_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<Uuid>,
    Extension(_principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    let issue = crate::blocking(move || issues::get_by_id(&state.db, issue_id)).await?;
    Ok(Json(issue))
}

pub async fn upvote_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<Uuid>,
    Extension(_principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    let upvotes = crate::blocking(move || issues::upvote(&state.db, issue_id)).await?;
    Ok(Json(serde_json::json!({ "upvotes": upvotes })))
}

pub async fn downvote_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<Uuid>,
    Extension(_principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    let downvotes = crate::blocking(move || issues::downvote(&state.db, issue_id)).await?;
    Ok(Json(serde_json::json!({ "downvotes": downvotes })))
}
