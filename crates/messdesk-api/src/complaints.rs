use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use messdesk_core::complaints;
use messdesk_types::api::{ComplaintPatch, CreateComplaintRequest};
use messdesk_types::models::{Mess, Principal};

use crate::auth::AppState;
use crate::error::ApiResult;

pub async fn create_complaint(
    State(state): State<AppState>,
    Path(mess): Path<Mess>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<CreateComplaintRequest>,
) -> ApiResult<impl IntoResponse> {
    let complaint =
        crate::blocking(move || complaints::create(&state.db, &principal, mess, req)).await?;
    Ok((StatusCode::CREATED, Json(complaint)))
}

pub async fn update_complaint(
    State(state): State<AppState>,
    Path(complaint_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(patch): Json<ComplaintPatch>,
) -> ApiResult<impl IntoResponse> {
    let complaint = crate::blocking(move || {
        complaints::update(&state.db, &state.files, &principal, complaint_id, patch)
    })
    .await?;
    Ok(Json(complaint))
}

pub async fn delete_complaint(
    State(state): State<AppState>,
    Path(complaint_id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<impl IntoResponse> {
    crate::blocking(move || complaints::delete(&state.db, &principal, complaint_id)).await?;
    Ok(Json(serde_json::json!({ "message": "Complaint deleted successfully" })))
}
