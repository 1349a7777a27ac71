use axum::{
    Router,
    extract::{Multipart, Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::technology::{CreateTechnology, Technology, UpdateTechnology};
use deployment::Deployment;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ValidatedJson, read_file},
    session::AdminSession,
};

pub async fn list_technologies(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Technology>>>, ApiError> {
    let technologies = deployment.technologies().list().await?;
    Ok(ResponseJson(ApiResponse::success(technologies)))
}

pub async fn get_technology(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Technology>>, ApiError> {
    let technology = deployment.technologies().get(id).await?;
    Ok(ResponseJson(ApiResponse::success(technology)))
}

pub async fn get_technology_by_slug(
    State(deployment): State<DeploymentImpl>,
    Path(slug): Path<String>,
) -> Result<ResponseJson<ApiResponse<Technology>>, ApiError> {
    let technology = deployment.technologies().get_by_slug(&slug).await?;
    Ok(ResponseJson(ApiResponse::success(technology)))
}

pub async fn create_technology(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<CreateTechnology>,
) -> Result<ResponseJson<ApiResponse<Technology>>, ApiError> {
    let technology = deployment.technologies().create(payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        technology,
        "Technology created",
    )))
}

pub async fn update_technology(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<UpdateTechnology>,
) -> Result<ResponseJson<ApiResponse<Technology>>, ApiError> {
    let technology = deployment.technologies().update(id, payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        technology,
        "Technology updated",
    )))
}

pub async fn delete_technology(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.technologies().delete(id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Technology deleted",
    )))
}

pub async fn upload_technology_image(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
    multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<Technology>>, ApiError> {
    let file = read_file(multipart).await?;
    let technology = deployment.technologies().set_image(id, file).await?;
    Ok(ResponseJson(ApiResponse::success(technology)))
}

pub async fn delete_technology_image(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<Technology>>, ApiError> {
    let technology = deployment.technologies().remove_image(id).await?;
    Ok(ResponseJson(ApiResponse::success(technology)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/technologies",
        Router::new()
            .route("/", get(list_technologies).post(create_technology))
            .route("/slug/{slug}", get(get_technology_by_slug))
            .route(
                "/{id}",
                get(get_technology)
                    .put(update_technology)
                    .delete(delete_technology),
            )
            .route(
                "/{id}/image",
                put(upload_technology_image).delete(delete_technology_image),
            ),
    )
}
