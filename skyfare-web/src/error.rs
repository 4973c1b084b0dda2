//! Error types for skyfare-web
//!
//! Maps the core's typed failures onto HTTP responses with a stable
//! `{"error": {"code", "message"}}` body.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use skyfare_core::PredictError;
use thiserror::Error;
use tracing::error;

/// Shown to users when the pipeline raises; the cause goes to the logs
pub const PREDICTION_FAILED_MESSAGE: &str =
    "Prediction failed. Check that the model file and feature names match.";

/// Shown to users when no model could be loaded; the attempted files go to the logs
pub const MODEL_UNAVAILABLE_MESSAGE: &str =
    "The fare model is not available. Check the server logs for details.";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Form input rejected before reaching the core (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Query precondition violated (400)
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Pipeline raised during prediction (422)
    #[error("Prediction failed: {0}")]
    PredictionFailed(String),

    /// No model artifact could be loaded (503)
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Blocking task panicked or was cancelled (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::InvalidQuery(msg) => ApiError::InvalidQuery(msg),
            PredictError::PredictionFailed(cause) => ApiError::PredictionFailed(cause),
            PredictError::ModelUnavailable(e) => ApiError::ModelUnavailable(e.to_string()),
        }
    }
}

impl From<skyfare_core::ModelUnavailable> for ApiError {
    fn from(err: skyfare_core::ModelUnavailable) -> Self {
        ApiError::ModelUnavailable(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, "INVALID_QUERY", msg),
            ApiError::PredictionFailed(cause) => {
                error!("Prediction failed: {}", cause);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "PREDICTION_FAILED",
                    PREDICTION_FAILED_MESSAGE.to_string(),
                )
            }
            ApiError::ModelUnavailable(detail) => {
                error!("Model unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "MODEL_UNAVAILABLE",
                    MODEL_UNAVAILABLE_MESSAGE.to_string(),
                )
            }
            ApiError::Internal(cause) => {
                error!("Internal error: {}", cause);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
