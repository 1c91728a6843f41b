//! HTTP error mapping

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::ChatError;

/// Error body returned by every endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Endpoint errors with HTTP status mapping
///
/// `Unavailable` and `Internal` carry detail for the log only; clients get a
/// fixed message.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    Unavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Same as `From<ChatError>`, except storage failures count as unavailable
    pub fn from_chat_turn(err: ChatError) -> Self {
        match err {
            ChatError::Store(e) => ApiError::Unavailable(e.to_string()),
            other => other.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::Validation(m) | ApiError::NotFound(m) => m,
            ApiError::Unavailable(detail) => {
                tracing::error!("Upstream failure: {}", detail);
                "Service temporarily unavailable".to_string()
            }
            ApiError::Internal(detail) => {
                tracing::error!("Internal failure: {}", detail);
                "Internal server error".to_string()
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::Validation(msg) => ApiError::Validation(msg),
            ChatError::NotFound(_) => ApiError::NotFound("Conversation not found".to_string()),
            ChatError::Store(e) => ApiError::Internal(e.to_string()),
            ChatError::Generator(e) => ApiError::Unavailable(e.to_string()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}
