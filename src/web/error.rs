use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::alerting::AlertingError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not Found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };
        (status, Json(serde_json::json!({ "error": error_message }))).into_response()
    }
}

impl From<AlertingError> for AppError {
    fn from(err: AlertingError) -> Self {
        match err {
            AlertingError::BadRequest(_) | AlertingError::Scope(_) | AlertingError::Param(_) => {
                AppError::InvalidInput(err.to_string())
            }
            AlertingError::NotFound(_) => AppError::NotFound(err.to_string()),
            AlertingError::AlreadyExists(_) | AlertingError::Ambiguous { .. } => {
                AppError::Conflict(err.to_string())
            }
            AlertingError::Remote(_) | AlertingError::Kube(_) | AlertingError::Id(_) => {
                error!(error = %err, "Upstream call failed.");
                AppError::InternalServerError(err.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}
