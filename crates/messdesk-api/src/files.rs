use axum::{
    Extension, Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use messdesk_core::Error as CoreError;
use messdesk_core::storage::FileStore;
use messdesk_types::api::UploadResponse;
use messdesk_types::models::Principal;

use crate::auth::AppState;
use crate::error::ApiResult;

/// 10 MB upload limit for complaint/issue images
const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// POST /uploads — accepts raw image bytes (application/octet-stream),
/// writes them through the file store, returns the stored path for use in
/// a subsequent create/update request.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(_principal): Extension<Principal>,
    bytes: Bytes,
) -> ApiResult<impl IntoResponse> {
    if bytes.is_empty() {
        return Err(CoreError::validation("upload body is empty").into());
    }
    if bytes.len() > MAX_IMAGE_SIZE {
        return Err(CoreError::validation("image exceeds the 10 MB limit").into());
    }

    let size = bytes.len() as u64;
    let path = crate::blocking(move || {
        state.files.store(&bytes).map_err(CoreError::Internal)
    })
    .await?;

    Ok((StatusCode::CREATED, Json(UploadResponse { path, size })))
}
