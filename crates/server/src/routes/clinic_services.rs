//! `/api/services`: the treatments listed on the public site.

use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::clinic_service::{ClinicService, CreateClinicService, UpdateClinicService};
use deployment::Deployment;
use serde::Deserialize;
use services::services::content::ContentError;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::{ValidatedJson, read_file},
    session::{AdminSession, Session},
};

#[derive(Debug, Default, Deserialize)]
pub struct ListServicesQuery {
    /// Include unpublished drafts. Admin only.
    #[serde(default)]
    pub all: bool,
    pub category_id: Option<Uuid>,
}

fn is_admin(session: &Option<Session>) -> bool {
    session.as_ref().is_some_and(|Session(claims)| claims.is_admin())
}

pub async fn list_services(
    State(deployment): State<DeploymentImpl>,
    Query(query): Query<ListServicesQuery>,
    session: Option<Session>,
) -> Result<ResponseJson<ApiResponse<Vec<ClinicService>>>, ApiError> {
    if query.all && !is_admin(&session) {
        return Err(ApiError::Unauthorized("admin role required"));
    }
    let services = deployment.clinic_services();
    let mut listed = match query.category_id {
        Some(category_id) => services.list_by_category(category_id).await?,
        None if query.all => services.list().await?,
        None => services.list_published().await?,
    };
    if !query.all {
        listed.retain(|service| service.is_published);
    }
    Ok(ResponseJson(ApiResponse::success(listed)))
}

pub async fn get_service(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    session: Option<Session>,
) -> Result<ResponseJson<ApiResponse<ClinicService>>, ApiError> {
    let service = deployment.clinic_services().get(id).await?;
    if !service.is_published && !is_admin(&session) {
        return Err(ContentError::NotFound("service").into());
    }
    Ok(ResponseJson(ApiResponse::success(service)))
}

pub async fn get_service_by_slug(
    State(deployment): State<DeploymentImpl>,
    Path(slug): Path<String>,
    session: Option<Session>,
) -> Result<ResponseJson<ApiResponse<ClinicService>>, ApiError> {
    let service = deployment
        .clinic_services()
        .get_by_slug(&slug, is_admin(&session))
        .await?;
    Ok(ResponseJson(ApiResponse::success(service)))
}

pub async fn create_service(
    State(deployment): State<DeploymentImpl>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<CreateClinicService>,
) -> Result<ResponseJson<ApiResponse<ClinicService>>, ApiError> {
    let service = deployment.clinic_services().create(payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        service,
        "Service created",
    )))
}

pub async fn update_service(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
    ValidatedJson(payload): ValidatedJson<UpdateClinicService>,
) -> Result<ResponseJson<ApiResponse<ClinicService>>, ApiError> {
    let service = deployment.clinic_services().update(id, payload).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        service,
        "Service updated",
    )))
}

pub async fn delete_service(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.clinic_services().delete(id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message((), "Service deleted")))
}

/// PUT /api/services/{id}/image (multipart, field `file`)
pub async fn upload_service_image(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
    multipart: Multipart,
) -> Result<ResponseJson<ApiResponse<ClinicService>>, ApiError> {
    let file = read_file(multipart).await?;
    let service = deployment.clinic_services().set_image(id, file).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        service,
        "Image uploaded",
    )))
}

pub async fn delete_service_image(
    State(deployment): State<DeploymentImpl>,
    Path(id): Path<Uuid>,
    _admin: AdminSession,
) -> Result<ResponseJson<ApiResponse<ClinicService>>, ApiError> {
    let service = deployment.clinic_services().remove_image(id).await?;
    Ok(ResponseJson(ApiResponse::success_with_message(
        service,
        "Image removed",
    )))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/services",
        Router::new()
            .route("/", get(list_services).post(create_service))
            .route("/slug/{slug}", get(get_service_by_slug))
            .route(
                "/{id}",
                get(get_service).put(update_service).delete(delete_service),
            )
            .route(
                "/{id}/image",
                put(upload_service_image).delete(delete_service_image),
            ),
    )
}
