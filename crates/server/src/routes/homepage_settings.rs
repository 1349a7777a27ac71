use axum::{
    Router,
    extract::{Multipart, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::homepage_settings::{HomepageSettings, UpsertHomepageSettings};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ValidatedJson, read_file},
    session::AdminSession,
};

pub async fn get_homepage_settings(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Option<HomepageSettings>>>, ApiError> {
    let settings = deployment.homepage_settings().get().await?;
    Ok(ResponseJson(ApiResponse::success(settings)))
}

pub async fn upsert_homepage_settings(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<UpsertHomepageSettings>,
) -> Result<ResponseJson<ApiResponse<HomepageSettings>>, ApiError> {
    let settings = deployment.homepage_settings().upsert(payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        settings,
        "Homepage settings saved",
    )))
}

pub async fn upload_hero_image(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
    multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<HomepageSettings>>, ApiError> {
    let file = read_file(multipart).await?;
    let settings = deployment.homepage_settings().set_hero_image(file).await?;
    Ok(ResponseJson(ApiResponse::success(settings)))
}

pub async fn delete_hero_image(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<HomepageSettings>>, ApiError> {
    let settings = deployment.homepage_settings().remove_hero_image().await?;
    Ok(ResponseJson(ApiResponse::success(settings)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new()
        .route(
            "/homepage-settings",
            get(get_homepage_settings).put(upsert_homepage_settings),
        )
        .route(
            "/homepage-settings/image",
            put(upload_hero_image).delete(delete_hero_image),
        )
}
