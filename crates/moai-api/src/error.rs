use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use moai_core::CoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(core) => match core {
                CoreError::ResourceBusy(_) | CoreError::AlreadyActive(_) => StatusCode::CONFLICT,
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::ArtifactTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
                CoreError::ArtifactProcessExited(_) => StatusCode::BAD_REQUEST,
                CoreError::PortExhausted { .. } | CoreError::Cancelled(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                CoreError::ServiceNotReady(_) => StatusCode::BAD_GATEWAY,
                CoreError::ContainerStartFailure { .. }
                | CoreError::TrainConfig { .. }
                | CoreError::Relocation { .. }
                | CoreError::Runtime(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        warn!(%status, error = %self, "request failed");
        let body = ErrorBody {
            status: "error",
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
