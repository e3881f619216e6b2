use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::candidates::repository::StoreError;
use crate::candidates::service::CandidateError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Candidate(#[from] CandidateError),

    /// Body that could not be read as the expected JSON.
    #[error(transparent)]
    InvalidBody(#[from] JsonRejection),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::Candidate(CandidateError::Persistence(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Candidate(CandidateError::Validation(e)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", e.to_string())
            }
            AppError::Candidate(CandidateError::DuplicateEmail) => (
                StatusCode::CONFLICT,
                "DUPLICATE_EMAIL",
                self.to_string(),
            ),
            AppError::Candidate(CandidateError::Persistence(e)) => {
                tracing::error!("Persistence error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_ERROR",
                    e.to_string(),
                )
            }
            // malformed JSON or wrong value types: same envelope as a rule violation
            AppError::InvalidBody(
                rejection @ (JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_)),
            ) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                rejection.body_text(),
            ),
            AppError::InvalidBody(rejection) => {
                (rejection.status(), "INVALID_BODY", rejection.body_text())
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
