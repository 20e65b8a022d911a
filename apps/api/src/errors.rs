use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::study_guide::generator::GenerationError;

const FALLBACK_MESSAGE: &str = "Failed to generate study guide";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
/// Every variant renders as `500 {"success": false, "error": <message>}`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("Failed to generate study guide")]
    EmptyGuide,

    #[error("An unexpected error occurred: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Generation(e) => tracing::error!("Study guide generation failed: {e}"),
            AppError::EmptyGuide => tracing::error!("Generator returned an empty study guide"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
        }

        let message = self.to_string();
        let message = if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}
