use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::servicenow::ServiceNowError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    RecordNotFound(String),

    /// ServiceNow answered with a non-2xx status; the response mirrors it.
    #[error("{message}")]
    VendorApi { status: u16, message: String },

    #[error("{0}")]
    SummarizationApi(String),

    #[error("{0}")]
    MalformedModelOutput(String),

    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::RecordNotFound(_) => StatusCode::NOT_FOUND,
            AppError::VendorApi { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::SummarizationApi(_)
            | AppError::MalformedModelOutput(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ServiceNowError> for AppError {
    fn from(err: ServiceNowError) -> Self {
        match err {
            ServiceNowError::NotFound { .. } => AppError::RecordNotFound(err.to_string()),
            ServiceNowError::Api { status, .. } => AppError::VendorApi {
                status,
                message: err.to_string(),
            },
            other => AppError::Internal(anyhow::Error::new(other)),
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::MalformedOutput(_) => AppError::MalformedModelOutput(err.to_string()),
            other => AppError::SummarizationApi(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();

        if status.is_server_error() {
            tracing::error!("Request failed ({status}): {message}");
        } else {
            tracing::warn!("Request rejected ({status}): {message}");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
