//! `/api/office-policy`, `/api/privacy-policy` and `/api/terms-of-service`.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{MethodRouter, get},
};
use db::models::policy_document::{PolicyDocument, PolicyDocumentKind, UpsertPolicyDocument};
use deployment::Deployment;
use utils::response::ApiResponse;

use crate::{DeploymentImpl, error::ApiError, extract::ValidatedJson, session::AdminSession};

/// GET /api/{document}
/// Public. `data` is null until the document is first saved.
pub async fn get_document(
    deployment: DeploymentImpl,
    kind: PolicyDocumentKind,
) -> Result<ResponseJson<ApiResponse<Option<PolicyDocument>>>, ApiError> {
    let document = deployment.policy_documents(kind).get().await?;
    Ok(ResponseJson(ApiResponse::success(document)))
}

/// POST /api/{document}
pub async fn save_document(
    deployment: DeploymentImpl,
    kind: PolicyDocumentKind,
    AdminSession(claims): AdminSession,
    payload: UpsertPolicyDocument,
) -> Result<ResponseJson<ApiResponse<PolicyDocument>>, ApiError> {
    let document = deployment
        .policy_documents(kind)
        .create_or_update(&payload)
        .await?;
    tracing::info!(document = %kind, user_id = %claims.sub, "Policy document saved");
    Ok(ResponseJson(ApiResponse::success_with_message(
        document,
        format!("{} saved successfully", kind.title()),
    )))
}

/// DELETE /api/{document}
/// Always rejected.
pub async fn delete_document(
    deployment: DeploymentImpl,
    kind: PolicyDocumentKind,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    deployment.policy_documents(kind).delete().await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

fn document_routes(kind: PolicyDocumentKind) -> MethodRouter<DeploymentImpl> {
    get(move |State(deployment): State<DeploymentImpl>| get_document(deployment, kind))
        .post(
            move |State(deployment): State<DeploymentImpl>,
                  session: AdminSession,
                  ValidatedJson(payload): ValidatedJson<UpsertPolicyDocument>| {
                save_document(deployment, kind, session, payload)
            },
        )
        .delete(move |State(deployment): State<DeploymentImpl>| delete_document(deployment, kind))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    PolicyDocumentKind::ALL
        .into_iter()
        .fold(Router::new(), |router, kind| {
            router.route(&format!("/{kind}"), document_routes(kind))
        })
}
