//! `/api/patient-instructions`: pre- and post-treatment guidance with an
//! optional PDF attachment.

use std::time::Duration;

use axum::{
    Router,
    extract::{Multipart, Path, State},
    response::{Json as ResponseJson, Redirect},
    routing::get,
};
use db::models::patient_instruction::{
    CreatePatientInstruction, PatientInstruction, UpdatePatientInstruction,
};
use deployment::Deployment;
use services::services::content::ContentError;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ValidatedJson, read_file},
    session::AdminSession,
};

const ATTACHMENT_LINK_TTL: Duration = Duration::from_secs(15 * 60);

pub async fn list_instructions(
    State(deployment): State<DeploymentImpl>,
) -> Result<ResponseJson<ApiResponse<Vec<PatientInstruction>>>, ApiError> {
    let instructions = deployment.patient_instructions().list().await?;
    Ok(ResponseJson(ApiResponse::success(instructions)))
}

pub async fn get_instruction(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<PatientInstruction>>, ApiError> {
    let instruction = deployment.patient_instructions().get(id).await?;
    Ok(ResponseJson(ApiResponse::success(instruction)))
}

pub async fn get_instruction_by_slug(
    State(deployment): State<DeploymentImpl>,
    Path(slug): Path<String>,
) -> Result<ResponseJson<ApiResponse<PatientInstruction>>, ApiError> {
    let instruction = deployment.patient_instructions().get_by_slug(&slug).await?;
    Ok(ResponseJson(ApiResponse::success(instruction)))
}

pub async fn create_instruction(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<CreatePatientInstruction>,
) -> Result<ResponseJson<ApiResponse<PatientInstruction>>, ApiError> {
    let instruction = deployment.patient_instructions().create(payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        instruction,
        "Patient instruction created",
    )))
}

pub async fn update_instruction(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<UpdatePatientInstruction>,
) -> Result<ResponseJson<ApiResponse<PatientInstruction>>, ApiError> {
    let instruction = deployment.patient_instructions().update(id, payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        instruction,
        "Patient instruction updated",
    )))
}

pub async fn delete_instruction(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.patient_instructions().delete(id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        (),
        "Patient instruction deleted",
    )))
}

/// GET /api/patient-instructions/{id}/attachment
/// Redirects to a short-lived download link for the attachment.
pub async fn download_attachment(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    let instruction = deployment.patient_instructions().get(id).await?;
    let key = instruction
        .attachment_key
        .ok_or(ContentError::NotFound("attachment"))?;
    let url = deployment
        .media()
        .signed_url(&key, ATTACHMENT_LINK_TTL)
        .await?;
    Ok(Redirect::temporary(&url))
}

pub async fn upload_attachment(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
    multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<PatientInstruction>>, ApiError> {
    let file = read_file(multipart).await?;
    let instruction = deployment
        .patient_instructions()
        .set_attachment(id, file)
        .await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        instruction,
        "Attachment uploaded",
    )))
}

pub async fn delete_attachment(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<PatientInstruction>>, ApiError> {
    let instruction = deployment.patient_instructions().remove_attachment(id).await?;
    Ok(ResponseJson(ApiResponse::success(instruction)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/patient-instructions",
        Router::new()
            .route("/", get(list_instructions).post(create_instruction))
            .route("/slug/{slug}", get(get_instruction_by_slug))
            .route(
                "/{id}",
                get(get_instruction)
                    .put(update_instruction)
                    .delete(delete_instruction),
            )
            .route(
                "/{id}/attachment",
                get(download_attachment)
                    .put(upload_attachment)
                    .delete(delete_attachment),
            ),
    )
}
