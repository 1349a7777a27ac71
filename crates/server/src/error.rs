use std::collections::BTreeMap;

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use services::services::{
    auth::AuthError, content::ContentError, media::MediaError,
    singleton_document::SingletonDocumentError,
};
use thiserror::Error;
use utils::response::ApiResponse;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    SingletonDocument(#[from] SingletonDocumentError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Media(#[from] MediaError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(&'static str),
}

/// Field name (camelCase) to the messages of every failed rule on it.
type FieldErrors = BTreeMap<String, Vec<String>>;

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::SingletonDocument(SingletonDocumentError::DeleteNotAllowed(_)) => {
                StatusCode::METHOD_NOT_ALLOWED
            }
            ApiError::SingletonDocument(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Content(err) => match err {
                ContentError::NotFound(_) => StatusCode::NOT_FOUND,
                ContentError::SlugTaken { .. } => StatusCode::CONFLICT,
                ContentError::InvalidSlug(_) | ContentError::UnknownCategory(_) => {
                    StatusCode::BAD_REQUEST
                }
                ContentError::Media(media) => media_status(media),
                ContentError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Media(err) => media_status(err),
            ApiError::Auth(err) => match err {
                AuthError::InvalidCredentials | AuthError::InvalidToken(_) => {
                    StatusCode::UNAUTHORIZED
                }
                AuthError::EmailTaken(_) => StatusCode::CONFLICT,
                AuthError::Database(_) | AuthError::Hash(_) | AuthError::Token(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Multipart(err) => err.status(),
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

fn media_status(err: &MediaError) -> StatusCode {
    match err {
        MediaError::Empty | MediaError::InvalidKey(_) => StatusCode::BAD_REQUEST,
        MediaError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        MediaError::UnsupportedType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        MediaError::Io(_) | MediaError::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn field_errors(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let messages = errors
                .iter()
                .map(|error| match &error.message {
                    Some(message) => message.to_string(),
                    None => format!("invalid value ({})", error.code),
                })
                .collect();
            (camel_case(&field), messages)
        })
        .collect()
}

/// Request bodies use camelCase keys, validator reports Rust field names.
fn camel_case(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
            // Internal details stay in the log. Singleton document errors
            // already carry a stable message.
            let message = match &self {
                ApiError::SingletonDocument(err) => err.to_string(),
                _ => "Internal server error".to_string(),
            };
            return (status, Json(ApiResponse::<()>::error(&message))).into_response();
        }

        let body = match &self {
            ApiError::Validation(errors) => {
                ApiResponse::<(), FieldErrors>::error_with_details(
                    "Validation failed",
                    field_errors(errors),
                )
            }
            other => ApiResponse::<(), FieldErrors>::error(&other.to_string()),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "Hosting date is required"))]
        hosting_date: String,
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            ApiError::from(SingletonDocumentError::DeleteNotAllowed("privacy policy")).status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ApiError::from(ContentError::NotFound("service")).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(ContentError::SlugTaken {
                entity: "service",
                slug: "implants".to_string()
            })
            .status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(ContentError::Media(MediaError::TooLarge { size: 2, limit: 1 }))
                .status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ApiError::from(AuthError::InvalidCredentials).status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_validation_details_are_per_field() {
        let errors = Payload {
            hosting_date: String::new(),
        }
        .validate()
        .unwrap_err();
        let details = field_errors(&errors);
        assert_eq!(details["hostingDate"], vec!["Hosting date is required"]);
    }
}
