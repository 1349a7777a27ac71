//! `/api/contact`: the public contact form and the admin inbox.

use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{delete, get, post},
};
use db::models::contact_message::{ContactMessage, CreateContactMessage};
use deployment::Deployment;
use serde::Serialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError, extract::ValidatedJson, session::AdminSession};

#[derive(Debug, Serialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UnreadCount {
    pub unread: i64,
}

/// POST /api/contact
/// Public. The stored message is not echoed back.
pub async fn submit_message(
    State(deployment): State<DeploymentImpl>,
    ValidatedJson(payload): ValidatedJson<CreateContactMessage>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.contact().submit(payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Thank you, we will get back to you shortly",
    )))
}

pub async fn list_messages(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<Vec<ContactMessage>>>, ApiError> {
    let messages = deployment.contact().list().await?;
    Ok(ResponseJson(ApiResponse::success(messages)))
}

pub async fn unread_count(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<UnreadCount>>, ApiError> {
    let unread = deployment.contact().unread_count().await?;
    Ok(ResponseJson(ApiResponse::success(UnreadCount { unread })))
}

pub async fn mark_read(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<ContactMessage>>, ApiError> {
    let message = deployment.contact().mark_read(id, true).await?;
    Ok(ResponseJson(ApiResponse::success(message)))
}

pub async fn mark_unread(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<ContactMessage>>, ApiError> {
    let message = deployment.contact().mark_read(id, false).await?;
    Ok(ResponseJson(ApiResponse::success(message)))
}

pub async fn delete_message(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.contact().delete(id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Message deleted")))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/contact",
        Router::new()
            .route("/", post(submit_message).get(list_messages))
            .route("/unread-count", get(unread_count))
            .route("/{id}", delete(delete_message))
            .route("/{id}/read", post(mark_read).delete(mark_unread)),
    )
}
