//! `/api/members`: the team page.

use axum::{
    Router,
    extract::{Multipart, Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::member::{CreateMember, Member, UpdateMember};
use deployment::Deployment;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ValidatedJson, read_file},
    session::AdminSession,
};

pub async fn list_members(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<Member>>>, ApiError> {
    let members = deployment.members().list().await?;
    Ok(ResponseJson(ApiResponse::success(members)))
}

pub async fn get_member(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Member>>, ApiError> {
    let member = deployment.members().get(id).await?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

pub async fn create_member(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<CreateMember>,
) -> Result<ResponseJson<ApiResponse<Member>>, ApiError> {
    let member = deployment.members().create(payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        member,
        "Team member added",
    )))
}

pub async fn update_member(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<UpdateMember>,
) -> Result<ResponseJson<ApiResponse<Member>>, ApiError> {
    let member = deployment.members().update(id, payload).await?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

pub async fn delete_member(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.members().delete(id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Team member removed",
    )))
}

/// PUT /api/members/{id}/image (multipart, field `file`)
pub async fn upload_member_image(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
    multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<Member>>, ApiError> {
    let file = read_file(multipart).await?;
    let member = deployment.members().set_image(id, file).await?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

pub async fn delete_member_image(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<Member>>, ApiError> {
    let member = deployment.members().remove_image(id).await?;
    Ok(ResponseJson(ApiResponse::success(member)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/members",
        Router::new()
            .route("/", get(list_members).post(create_member))
            .route(
                "/{id}",
                get(get_member).put(update_member).delete(delete_member),
            )
            .route(
                "/{id}/image",
                put(upload_member_image).delete(delete_member_image),
            ),
    )
}
