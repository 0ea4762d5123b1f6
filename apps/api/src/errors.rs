use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::analysis::error::AnalysisError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Analysis(err) => analysis_error_parts(err),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

/// Each analysis failure kind gets its own status and code. Model output is
/// never echoed back to the client.
fn analysis_error_parts(err: &AnalysisError) -> (StatusCode, &'static str, String) {
    match err {
        AnalysisError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        AnalysisError::Configuration(msg) => {
            tracing::error!("Analysis service misconfigured: {msg}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                "The analysis service is not available".to_string(),
            )
        }
        AnalysisError::UpstreamUnavailable(msg) => {
            tracing::error!("LLM upstream unavailable: {msg}");
            (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNAVAILABLE",
                "The AI service could not be reached, please try again".to_string(),
            )
        }
        AnalysisError::UpstreamRejected(reason) => {
            tracing::warn!("LLM upstream rejected request: {reason}");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                "UPSTREAM_REJECTED",
                "The AI service declined to process this input".to_string(),
            )
        }
        AnalysisError::MalformedResponse { reason, .. } => {
            tracing::error!("LLM response did not match schema: {reason}");
            (
                StatusCode::BAD_GATEWAY,
                "MALFORMED_RESPONSE",
                "The AI service returned an unreadable response".to_string(),
            )
        }
    }
}
