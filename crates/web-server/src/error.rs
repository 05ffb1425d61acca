use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Analysis error: {0}")]
    Pipeline(#[from] pipeline::PipelineError),
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Pipeline(pipeline::PipelineError::MissingInput(message)) => {
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Pipeline(err) => {
                tracing::error!(error = %err, "Analysis failed.");
                (StatusCode::UNPROCESSABLE_ENTITY, err.to_string())
            }
            AppError::Task(err) => {
                tracing::error!(error = ?err, "Analysis task failed.");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred during analysis".to_string(),
                )
            }
            AppError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
