use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use moai_core::StopOutcome;
use moai_model::{
    ExportRequest, InferenceRequest, StopRequest, TensorboardRequest, TrainRequest,
};

use crate::{ApiError, JobHandler};

/// HTTP surface builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: JobHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build the axum router.
    ///
    /// Routes:
    /// - POST /train
    /// - POST /inference
    /// - POST /export
    /// - POST /stop
    /// - POST /run_tensorboard
    /// - POST /stop_tensorboard
    pub fn router(self) -> Router {
        Router::new()
            .route("/train", post(train::<H>))
            .route("/inference", post(inference::<H>))
            .route("/export", post(export::<H>))
            .route("/stop", post(stop::<H>))
            .route("/run_tensorboard", post(run_tensorboard::<H>))
            .route("/stop_tensorboard", post(stop_tensorboard::<H>))
            .with_state(self.handler)
    }
}

// ============================================================================
// Response types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct JobResponse {
    status: String,
    message: String,
}

impl JobResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success".to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TensorboardResponse {
    status: String,
    message: String,
    port: u16,
}

fn stop_message(outcome: &StopOutcome, what: &str) -> String {
    match outcome {
        StopOutcome::Stopped { container } => format!("{what} {container} stopped"),
        StopOutcome::NothingToStop => format!("no active {what} to stop"),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /train
async fn train<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<TrainRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: JobHandler,
{
    info!(key = %req.key, model_type = %req.model_type, "train requested");
    handler.train(req).await?;
    Ok(Json(JobResponse::success("training results ready")))
}

/// POST /inference
async fn inference<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<InferenceRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: JobHandler,
{
    info!(key = %req.key, "inference requested");
    handler.inference(req).await?;
    Ok(Json(JobResponse::success("inference completed")))
}

/// POST /export
async fn export<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<ExportRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: JobHandler,
{
    info!(key = %req.key, "export requested");
    handler.export(req).await?;
    Ok(Json(JobResponse::success("export started")))
}

/// POST /stop
async fn stop<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<StopRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: JobHandler,
{
    info!(key = %req.key, "stop requested");
    let outcome = handler.stop(req).await?;
    Ok(Json(JobResponse::success(stop_message(&outcome, "job"))))
}

/// POST /run_tensorboard
async fn run_tensorboard<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<TensorboardRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: JobHandler,
{
    info!(key = %req.key, "tensorboard requested");
    let port = handler.start_tensorboard(req).await?;
    Ok(Json(TensorboardResponse {
        status: "success".to_string(),
        message: "tensorboard is live".to_string(),
        port,
    }))
}

/// POST /stop_tensorboard
async fn stop_tensorboard<H>(
    State(handler): State<Arc<H>>,
    Json(req): Json<TensorboardRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: JobHandler,
{
    info!(key = %req.key, "tensorboard stop requested");
    let outcome = handler.stop_tensorboard(req).await?;
    Ok(Json(JobResponse::success(stop_message(
        &outcome,
        "tensorboard",
    ))))
}
