use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use moai_core::{
    JobConfig, JobManager, MountLayout, StopCoordinator, StopOutcome, TensorboardConfig,
    TensorboardManager,
};
use moai_model::{
    ExportRequest, InferenceRequest, JobStatus, StopRequest, TensorboardRequest, TrainRequest,
};
use moai_runtime::ContainerRuntime;

use crate::{ApiError, JobHandler};

/// [`JobHandler`] backed directly by the orchestration core.
///
/// The shutdown token is handed to every bounded wait (artifact poll,
/// liveness probe) so a daemon shutdown aborts them promptly.
pub struct CoreAdapter<R: ContainerRuntime + 'static> {
    manager: JobManager<R>,
    stopper: StopCoordinator<R>,
    tensorboard: TensorboardManager<R>,
    shutdown: CancellationToken,
}

impl<R: ContainerRuntime + 'static> CoreAdapter<R> {
    pub fn new(
        runtime: Arc<R>,
        layout: MountLayout,
        jobs: JobConfig,
        tensorboard: TensorboardConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            manager: JobManager::new(Arc::clone(&runtime), layout.clone(), jobs),
            stopper: StopCoordinator::new(Arc::clone(&runtime), layout.clone()),
            tensorboard: TensorboardManager::new(runtime, layout, tensorboard),
            shutdown,
        }
    }
}

#[async_trait]
impl<R: ContainerRuntime + 'static> JobHandler for CoreAdapter<R> {
    async fn train(&self, req: TrainRequest) -> Result<JobStatus, ApiError> {
        Ok(self.manager.train(&req, &self.shutdown).await?)
    }

    async fn inference(&self, req: InferenceRequest) -> Result<JobStatus, ApiError> {
        Ok(self.manager.inference(&req).await?)
    }

    async fn export(&self, req: ExportRequest) -> Result<JobStatus, ApiError> {
        Ok(self.manager.export(&req).await?)
    }

    async fn stop(&self, req: StopRequest) -> Result<StopOutcome, ApiError> {
        Ok(self.stopper.stop(&req.key).await?)
    }

    async fn start_tensorboard(&self, req: TensorboardRequest) -> Result<u16, ApiError> {
        Ok(self.tensorboard.launch(&req.key, &self.shutdown).await?)
    }

    async fn stop_tensorboard(&self, req: TensorboardRequest) -> Result<StopOutcome, ApiError> {
        Ok(self.tensorboard.stop(&req.key).await?)
    }
}
