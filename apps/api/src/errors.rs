use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::error::ServiceError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Processing(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Collaborator outcomes map onto HTTP categories one-to-one.
impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Processing(msg) => AppError::Processing(msg),
            ServiceError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            AppError::BadRequest(message) => Json(json!({
                "error": {
                    "code": "BAD_REQUEST",
                    "message": message
                }
            })),
            AppError::ServiceUnavailable(message) => Json(json!({
                "error": {
                    "code": "SERVICE_UNAVAILABLE",
                    "message": message
                }
            })),
            AppError::Processing(detail) => {
                tracing::warn!("Processing error: {detail}");
                Json(json!({
                    "error": "Processing Error",
                    "detail": detail
                }))
            }
            AppError::Internal(detail) => {
                tracing::error!("Unexpected internal error: {detail}");
                Json(json!({
                    "error": "Internal Server Error",
                    "detail": detail
                }))
            }
        };

        (status, body).into_response()
    }
}
