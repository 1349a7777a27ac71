use axum::{
    Router,
    extract::{Multipart, State},
    response::Json as ResponseJson,
    routing::post,
};
use deployment::Deployment;
use services::services::media::{MediaPurpose, StoredMedia};
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, extract::read_file, session::AdminSession};

/// POST /api/uploads
/// Images embedded in rich-text content. The object is not tied to any
/// row, the editor keeps the returned URL.
pub async fn upload_editor_image(
    State(deployment): State<DeploymentImpl>,
    AdminSession(claims): AdminSession,
    multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<StoredMedia>>, ApiError> {
    let file = read_file(multipart).await?;
    let stored = deployment
        .media()
        .upload(file, MediaPurpose::EditorImage)
        .await?;
    tracing::info!(key = %stored.key, user_id = %claims.sub, "Uploaded editor image");
    Ok(ResponseJson(ApiResponse::success(stored)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/uploads", post(upload_editor_image))
}
