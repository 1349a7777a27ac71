use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// JSON envelope shared by every API endpoint.
///
/// `data` is always serialized (as `null` when there is nothing to return) so
/// clients can tell an absent record from a failed request by `success` alone.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ApiResponse<T, E = T> {
    success: bool,
    data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    details: Option<E>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T, E> ApiResponse<T, E> {
    /// Creates a successful response with `data` and no message.
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
            details: None,
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        ApiResponse {
            message: Some(message.into()),
            ..Self::success(data)
        }
    }

    /// Creates an error response carrying only a human readable message.
    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(message.to_string()),
            details: None,
            message: None,
        }
    }

    /// Creates an error response with structured details (e.g. field level issues).
    pub fn error_with_details(message: &str, details: E) -> Self {
        ApiResponse {
            details: Some(details),
            ..Self::error(message)
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn details(&self) -> Option<&E> {
        self.details.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
