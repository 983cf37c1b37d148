//! Mapping of internal errors to HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::bonds::{AddressError, ParamError};
use crate::chain::ChainError;
use crate::quoting::QuoteRequestError;
use crate::workflow::WorkflowError;

/// JSON error body: `{"error": "...", "code": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    code: &'static str,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Quote(#[from] QuoteRequestError),

    #[error(transparent)]
    Params(#[from] ParamError),

    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    QuoteUnavailable(String),
}

impl From<AddressError> for ApiError {
    fn from(error: AddressError) -> Self {
        ApiError::Params(ParamError::Account(error))
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Workflow(WorkflowError::Validation(_))
            | ApiError::Params(_)
            | ApiError::Quote(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION"),
            ApiError::Workflow(WorkflowError::Busy { .. }) => (StatusCode::CONFLICT, "BUSY"),
            ApiError::Workflow(WorkflowError::Transition(_)) => {
                (StatusCode::CONFLICT, "INVALID_TRANSITION")
            }
            ApiError::Workflow(WorkflowError::QuoteUnavailable(_)) | ApiError::QuoteUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "QUOTE_UNAVAILABLE")
            }
            ApiError::Workflow(WorkflowError::Chain(_)) | ApiError::Chain(_) => {
                (StatusCode::BAD_GATEWAY, "CHAIN")
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::warn!(code, error = %self, "Request failed");
        }
        let body = ErrorBody {
            error: self.to_string(),
            code,
        };
        (status, Json(body)).into_response()
    }
}
