use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, Multipart, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use services::services::media::IncomingFile;
use validator::Validate;

use crate::error::ApiError;

/// JSON body that has passed its `validator` rules.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Client-facing message for a body that could not be read as JSON. The
/// parser's own text names input positions, so it only goes to the log.
fn json_rejection(rejection: JsonRejection) -> ApiError {
    tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
    let message = match rejection {
        JsonRejection::MissingJsonContentType(_) => "Expected a JSON body",
        JsonRejection::JsonSyntaxError(_) => "Malformed JSON body",
        JsonRejection::JsonDataError(_) => "Request body has invalid field types",
        _ => "Could not read request body",
    };
    ApiError::BadRequest(message.to_string())
}

/// The `file` part of a multipart upload.
pub async fn read_file(mut multipart: Multipart) -> Result<IncomingFile, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes: Bytes = field.bytes().await?;
        return Ok(IncomingFile {
            file_name,
            content_type,
            bytes,
        });
    }
    Err(ApiError::BadRequest(
        "multipart body has no 'file' field".to_string(),
    ))
}
