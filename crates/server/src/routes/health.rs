use axum::{Router, extract::State, response::Json as ResponseJson, routing::get};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError};

pub async fn health_check(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<String>>, ApiError> {
    sqlx::query("SELECT 1")
        .execute(&deployment.db().pool)
        .await?;
    Ok(ResponseJson(ApiResponse::success("OK".to_string())))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().route("/health", get(health_check))
}
