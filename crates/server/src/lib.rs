use axum::{Router, extract::DefaultBodyLimit};
use deployment::Deployment;
use services::services::config::MediaBackendConfig;
use tower_http::{services::ServeDir, trace::TraceLayer};

pub mod error;
pub mod extract;
pub mod pages;
pub mod routes;
pub mod session;

pub type DeploymentImpl = local_deployment::LocalDeployment;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// The whole site: JSON API under `/api`, the public pages and, for the
/// local media backend, the uploaded files.
pub fn app(deployment: DeploymentImpl) -> Router {
    let body_limit = deployment.media().max_upload_bytes() + MULTIPART_OVERHEAD;

    let mut router = Router::new()
        .nest("/api", routes::router(&deployment))
        .merge(pages::router(&deployment));

    if let MediaBackendConfig::Local { root, public_path } = &deployment.config().media.backend {
        router = router.nest_service(public_path, ServeDir::new(root));
    }

    router
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}
