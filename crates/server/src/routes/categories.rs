use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::category::{Category, CreateCategory, UpdateCategory};
use deployment::Deployment;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::ValidatedJson, session::AdminSession};

pub async fn list_categories(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Category>>>, ApiError> {
    let categories = deployment.categories().list().await?;
    Ok(ResponseJson(ApiResponse::success(categories)))
}

pub async fn get_category(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    let category = deployment.categories().get(id).await?;
    Ok(ResponseJson(ApiResponse::success(category)))
}

pub async fn create_category(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<CreateCategory>,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    let category = deployment.categories().create(payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        category,
        "Category created",
    )))
}

pub async fn update_category(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<UpdateCategory>,
) -> Result<ResponseJson<ApiResponse<Category>>, ApiError> {
    let category = deployment.categories().update(id, payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        category,
        "Category updated",
    )))
}

pub async fn delete_category(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.categories().delete(id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Category deleted")))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/categories",
        Router::new()
            .route("/", get(list_categories).post(create_category))
            .route(
                "/{id}",
                get(get_category).put(update_category).delete(delete_category),
            ),
    )
}
