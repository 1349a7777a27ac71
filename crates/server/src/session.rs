//! Request extractors for the signed-in user.

use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    extract::cookie::CookieJar,
    headers::{Authorization, authorization::Bearer},
};
use deployment::Deployment;
use services::services::auth::Claims;

use crate::{DeploymentImpl, error::ApiError};

pub const SESSION_COOKIE: &str = "clinic_session";

/// Any signed-in user. The token comes from `Authorization: Bearer` or the
/// session cookie, in that order.
#[derive(Debug, Clone)]
pub struct Session(pub Claims);

/// A signed-in user with the admin role.
#[derive(Debug, Clone)]
pub struct AdminSession(pub Claims);

async fn session_token(parts: &mut Parts, state: &DeploymentImpl) -> Option<String> {
    if let Ok(TypedHeader(Authorization(bearer))) =
        <TypedHeader<Authorization<Bearer>> as FromRequestParts<DeploymentImpl>>::from_request_parts(
            parts, state,
        )
        .await
    {
        return Some(bearer.token().to_string());
    }
    let jar = CookieJar::from_headers(&parts.headers);
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

impl FromRequestParts<DeploymentImpl> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts, state)
            .await
            .ok_or(ApiError::Unauthorized("authentication required"))?;
        let claims = state.auth().verify(&token)?;
        Ok(Session(claims))
    }
}

impl OptionalFromRequestParts<DeploymentImpl> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &DeploymentImpl,
    ) -> Result<Option<Self>, Self::Rejection> {
        Ok(<Session as FromRequestParts<DeploymentImpl>>::from_request_parts(parts, state)
            .await
            .ok())
    }
}

impl FromRequestParts<DeploymentImpl> for AdminSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let Session(claims) =
            <Session as FromRequestParts<DeploymentImpl>>::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            tracing::info!(user_id = %claims.sub, "Rejected non-admin session");
            return Err(ApiError::Unauthorized("admin role required"));
        }
        Ok(AdminSession(claims))
    }
}
