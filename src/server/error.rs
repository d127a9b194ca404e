//! Error types for the server

use crate::error::{ErrorKind, PipelineError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("cannot predict: {0}")]
    BadRequest(String),

    #[error("cannot predict: missing artifact {0}")]
    ArtifactUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// Classify a failure raised while loading the serving artifacts.
    pub fn from_load(err: PipelineError) -> Self {
        match err.root() {
            PipelineError::ArtifactMissing(path) => ServerError::ArtifactUnavailable(path.clone()),
            PipelineError::CorruptArtifact { path, reason } => {
                ServerError::ArtifactUnavailable(format!("{} ({})", path, reason))
            }
            _ if err.kind() == ErrorKind::Io => ServerError::ArtifactUnavailable(err.to_string()),
            _ => ServerError::Internal(err.to_string()),
        }
    }
}

impl From<PipelineError> for ServerError {
    fn from(err: PipelineError) -> Self {
        match err.kind() {
            ErrorKind::Validation => ServerError::BadRequest(err.root().to_string()),
            ErrorKind::Io => ServerError::from_load(err),
            ErrorKind::Config | ErrorKind::Computation => ServerError::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::ArtifactUnavailable(detail) => {
                tracing::warn!(detail = %detail, "Prediction requested without usable artifacts");
                StatusCode::SERVICE_UNAVAILABLE
            }
            ServerError::Internal(detail) => {
                tracing::error!(detail = %detail, "Internal server error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let message = match &self {
            ServerError::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": true,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ServerError>;
