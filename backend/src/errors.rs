use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use thiserror::Error;
use zk_sum::ZkError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("prover unavailable: {0}")]
    Unavailable(String),

    #[error("internal error")]
    Internal,
}

/// Caller mistakes become 400s; a failing prover is surfaced as 502 with its diagnostics.
impl From<ZkError> for ApiError {
    fn from(e: ZkError) -> Self {
        match e {
            ZkError::InvalidArgumentCount { .. } => ApiError::BadRequest(e.to_string()),
            ZkError::ExternalProverFailure(_) | ZkError::MalformedProofArtifact { .. } => {
                ApiError::Unavailable(e.to_string())
            }
            other => {
                tracing::error!(error = %other, "pipeline error");
                ApiError::Internal
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, msg) = match &self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            ApiError::Unavailable(m) => (StatusCode::BAD_GATEWAY, m.clone()),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "internal error".to_string()),
        };

        (status, Json(ErrorBody { error: msg })).into_response()
    }
}
