use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use snafu::Snafu;

use crate::service::EngineError;

#[derive(Debug, Snafu)]
pub enum ApiError {
    #[snafu(transparent)]
    Engine { source: EngineError },
}

impl ApiError {
    /// `NotFound` is the caller's to recover from; everything else is a
    /// server-side failure.
    fn status(&self) -> StatusCode {
        let ApiError::Engine { source } = self;

        match source {
            EngineError::NotFound { .. } => StatusCode::NOT_FOUND,
            EngineError::Conflict | EngineError::ConflictRetryExhausted { .. } => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            EngineError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
