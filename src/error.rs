use axum::extract::multipart::MultipartError;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

use crate::response::ApiResponse;
use crate::storage::StorageError;
use crate::workflow::WorkflowError;

/// HTTP-boundary error. Everything a handler can fail with converts into one
/// of these; `IntoResponse` maps it to a status code and the failure envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),
    #[error("{0}")]
    BadRequest(String),
    #[error("Failed to read the uploaded file.")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// Malformed request bodies are a validation failure, not a 422.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<StorageError> for ApiError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::UnsupportedType(_) | StorageError::TooLarge { .. } => {
                ApiError::BadRequest(err.to_string())
            }
            StorageError::Io(e) => ApiError::Io(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Workflow(err) => match err {
                WorkflowError::Validation(_)
                | WorkflowError::InvalidTransition { .. }
                | WorkflowError::InvalidState(_) => StatusCode::BAD_REQUEST,
                WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
                WorkflowError::Unauthorized(_) => StatusCode::FORBIDDEN,
                WorkflowError::Conflict(_) => StatusCode::CONFLICT,
                WorkflowError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::BadRequest(_) | ApiError::Multipart(_) => StatusCode::BAD_REQUEST,
            ApiError::Database(_) | ApiError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
        }

        let body = ApiResponse::<()>::error(self.to_string());
        (status, Json(body)).into_response()
    }
}
