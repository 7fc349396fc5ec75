use async_trait::async_trait;

use moai_core::StopOutcome;
use moai_model::{
    ExportRequest, InferenceRequest, JobStatus, StopRequest, TensorboardRequest, TrainRequest,
};

use crate::ApiError;

/// Backend contract of the HTTP surface.
///
/// [`CoreAdapter`](crate::CoreAdapter) is the ready-made implementation;
/// a custom one can wrap it with auth, queueing or similar concerns.
#[async_trait]
pub trait JobHandler: Send + Sync + 'static {
    async fn train(&self, req: TrainRequest) -> Result<JobStatus, ApiError>;

    async fn inference(&self, req: InferenceRequest) -> Result<JobStatus, ApiError>;

    async fn export(&self, req: ExportRequest) -> Result<JobStatus, ApiError>;

    async fn stop(&self, req: StopRequest) -> Result<StopOutcome, ApiError>;

    /// Returns the host port the TensorBoard UI was verified live on.
    async fn start_tensorboard(&self, req: TensorboardRequest) -> Result<u16, ApiError>;

    async fn stop_tensorboard(&self, req: TensorboardRequest) -> Result<StopOutcome, ApiError>;
}
