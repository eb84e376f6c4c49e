use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ports::StoreError;
use crate::validation::{ValidationError, AMOUNT_FIELD};

/// Terminal failures of the HTTP handlers.
///
/// Client errors describe the problem; server errors render a fixed message
/// and keep the cause for the log only.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("invalid request body")]
    InvalidBody(String),

    #[error("invalid transaction ID")]
    InvalidTransactionId(ValidationError),

    #[error("invalid amount")]
    InvalidAmount(ValidationError),

    #[error("internal server error")]
    StorageFailure(#[source] StoreError),

    #[error("unhealthy")]
    Unhealthy(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::InvalidBody(_)
            | AppError::InvalidTransactionId(_)
            | AppError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            AppError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Unhealthy(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        if err.field == AMOUNT_FIELD {
            AppError::InvalidAmount(err)
        } else {
            AppError::InvalidTransactionId(err)
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StorageFailure(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
