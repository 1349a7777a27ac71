//! `/api/auth`: sign-in for the admin area.

use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use deployment::Deployment;
use services::services::auth::{Claims, LoginRequest, Session as LoginSession};
use utils::response::ApiResponse;

use crate::{
    DeploymentImpl,
    error::ApiError,
    extract::ValidatedJson,
    session::{SESSION_COOKIE, Session},
};

fn session_cookie(token: String) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// POST /api/auth/login
/// Returns the token and also sets it as an HttpOnly cookie for the
/// server-rendered admin pages.
pub async fn login(
    State(deployment): State<DeploymentImpl>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<(CookieJar, ResponseJson<ApiResponse<LoginSession>>), ApiError> {
    let session = deployment
        .auth()
        .login(&payload.email, &payload.password)
        .await?;
    let jar = jar.add(session_cookie(session.token.clone()));
    Ok((jar, ResponseJson(ApiResponse::success(session))))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, ResponseJson<ApiResponse<()>>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (
        jar,
        ResponseJson(ApiResponse::success_with_message((), "Signed out")),
    )
}

/// GET /api/auth/session
pub async fn current_session(
    Session(claims): Session,
) -> Result<ResponseJson<ApiResponse<Claims>>, ApiError> {
    Ok(ResponseJson(ApiResponse::success(claims)))
}

pub fn router(_deployment: &DeploymentImpl) -> Router<DeploymentImpl> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/login", post(login))
            .route("/logout", post(logout))
            .route("/session", get(current_session)),
    )
}
