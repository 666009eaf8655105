//! Authority-tier routes: scoped complaint review, the escalation
//! transition, reporting windows, and issue administration.

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use messdesk_core::{complaints, issues};
use messdesk_types::api::{SetResolvedRequest, StatusPatch};
use messdesk_types::models::{Mess, Principal, Window};

use crate::auth::AppState;
use crate::error::ApiResult;

pub async fn list_complaints(
    State(state): State<AppState>,
    Path(mess): Path<Mess>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    let list =
        crate::blocking(move || complaints::list_for_mess(&state.db, &principal, mess)).await?;
    Ok(Json(list))
}

pub async fn update_complaint_status(
    State(state): State<AppState>,
    Path(complaint_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(patch): Json<StatusPatch>,
) -> ApiResult<impl IntoResponse> {
    let complaint = crate::blocking(move || {
        complaints::update_status(&state.db, &principal, complaint_id, patch)
    })
    .await?;
    Ok(Json(complaint))
}

pub async fn daily_complaints(
    State(state): State<AppState>,
    Path(mess): Path<Mess>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    window_complaints(state, principal, mess, Window::Daily).await
}

pub async fn weekly_complaints(
    State(state): State<AppState>,
    Path(mess): Path<Mess>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    window_complaints(state, principal, mess, Window::Weekly).await
}

async fn window_complaints(
    state: AppState,
    principal: Principal,
    mess: Mess,
    window: Window,
) -> ApiResult<Json<Vec<messdesk_types::models::Complaint>>> {
    let list = crate::blocking(move || {
        complaints::list_by_window(&state.db, &principal, mess, window)
    })
    .await?;
    Ok(Json(list))
}

pub async fn set_issue_resolved(
    State(state): State<AppState>,
    Path(issue_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<SetResolvedRequest>,
) -> ApiResult<impl IntoResponse> {
    let issue = crate::blocking(move || {
        issues::set_resolved(&state.db, &principal, issue_id, req.resolved)
    })
    .await?;
    Ok(Json(issue))
}

pub async fn admin_delete_issue(
    State(state): State<AppState>,
    Path(issue_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    crate::blocking(move || issues::admin_delete(&state.db, &principal, issue_id)).await?;
    Ok(Json(serde_json::json!({ "message": "Issue deleted successfully" })))
}
