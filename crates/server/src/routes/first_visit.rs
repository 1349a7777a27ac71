use axum::{
    Router,
    extract::{Multipart, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::first_visit::{FirstVisit, UpsertFirstVisit};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ValidatedJson, read_file},
    session::AdminSession,
};

/// GET /api/first-visit
/// `data` is null until the page has been written.
pub async fn get_first_visit(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Option<FirstVisit>>>, ApiError> {
    let page = deployment.first_visit().get().await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

pub async fn upsert_first_visit(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<UpsertFirstVisit>,
) -> Result<ResponseJson<ApiResponse<FirstVisit>>, ApiError> {
    let page = deployment.first_visit().upsert(payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        page,
        "First visit page saved",
    )))
}

pub async fn upload_first_visit_image(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
    multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<FirstVisit>>, ApiError> {
    let file = read_file(multipart).await?;
    let page = deployment.first_visit().set_image(file).await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

pub async fn delete_first_visit_image(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<FirstVisit>>, ApiError> {
    let page = deployment.first_visit().remove_image().await?;
    Ok(ResponseJson(ApiResponse::success(page)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/first-visit",
            get(get_first_visit).put(upsert_first_visit),
        )
        .route(
            "/first-visit/image",
            put(upload_first_visit_image).delete(delete_first_visit_image),
        )
}
