use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use moai_model::{ExportRequest, InferenceRequest, JobKind, JobStatus, TrainRequest};
use moai_runtime::{ContainerRuntime, ContainerState, RunSpec};

use crate::{
    ArtifactPoll, CONTAINER_MOUNT, CoreError, CoreResult, MountLayout, TrainConfigStore, command,
    guard::check_exclusive, wait_for_artifact,
};

/// Host-resource knobs shared by every job container.
#[derive(Debug, Clone)]
pub struct JobConfig {
    /// Shared-memory size in bytes.
    pub shm_size: i64,
    pub poll: ArtifactPoll,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            shm_size: 32 * 1024 * 1024 * 1024,
            poll: ArtifactPoll::default(),
        }
    }
}

/// Drives a job from launch to completion detection to cleanup.
///
/// Every exit path — success, failure, timeout — leaves no container behind
/// under the job's name, so a retried job never collides with a stale one.
pub struct JobManager<R> {
    runtime: Arc<R>,
    layout: MountLayout,
    store: TrainConfigStore,
    config: JobConfig,
    /// Serializes "exclusivity check → container creation" so two exclusive
    /// launches cannot both pass the check before either container is
    /// visible.
    launch_gate: tokio::sync::Mutex<()>,
}

impl<R: ContainerRuntime + 'static> JobManager<R> {
    pub fn new(runtime: Arc<R>, layout: MountLayout, config: JobConfig) -> Self {
        let store = TrainConfigStore::new(layout.clone());
        Self {
            runtime,
            layout,
            store,
            config,
            launch_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// Launch a training job.
    ///
    /// The training command runs on a background task; this call returns
    /// once the results artifact appears (`Succeeded`) or the artifact wait
    /// fails. The artifact wait is the only bounded part — training itself
    /// keeps running in its container until its stream closes.
    pub async fn train(
        &self,
        req: &TrainRequest,
        cancel: &CancellationToken,
    ) -> CoreResult<JobStatus> {
        let name = req.key.container_name(JobKind::Train);
        {
            let _gate = self.launch_gate.lock().await;
            check_exclusive(self.runtime.as_ref(), JobKind::Train).await?;
            self.replace_stale(&name).await?;
            self.store.write(&req.key, &req.model_type)?;
            self.launch(&name, &format!("{}:latest", req.model_type))
                .await?;
        }
        self.spawn_exec(name.clone(), command::train_command(req));

        let artifact = self.layout.results_file(&req.key);
        match wait_for_artifact(
            self.runtime.as_ref(),
            &name,
            &artifact,
            &self.config.poll,
            cancel,
        )
        .await
        {
            Ok(()) => {
                info!(container = %name, "training results detected");
                if let Err(err) = self.runtime.stop(&name).await {
                    debug!(container = %name, error = %err, "stop after success");
                }
                self.runtime.remove(&name).await?;
                Ok(JobStatus::Succeeded)
            }
            Err(err) => {
                let _ = self.runtime.remove(&name).await;
                Err(err)
            }
        }
    }

    /// Launch a detection job and wait for it synchronously.
    ///
    /// Completion is the exec stream closing; there is no orchestrator-side
    /// timeout, the detection process is trusted to terminate.
    pub async fn inference(&self, req: &InferenceRequest) -> CoreResult<JobStatus> {
        let train_config = self.store.read(&req.key)?;
        let name = req.key.container_name(JobKind::Inference);
        {
            let _gate = self.launch_gate.lock().await;
            check_exclusive(self.runtime.as_ref(), JobKind::Inference).await?;
            self.replace_stale(&name).await?;
            self.launch(&name, &format!("{}:latest", train_config.model_type))
                .await?;
        }

        let cmd = command::inference_command(&train_config.model_type, req);
        match self.runtime.exec_drain(&name, &cmd).await {
            Ok(()) => {
                if let Err(err) = self.runtime.stop(&name).await {
                    debug!(container = %name, error = %err, "stop after success");
                }
                self.runtime.remove(&name).await?;
                Ok(JobStatus::Succeeded)
            }
            Err(err) => {
                let _ = self.runtime.remove(&name).await;
                Err(err.into())
            }
        }
    }

    /// Launch a model export and return immediately.
    ///
    /// Export is ancillary: it skips the exclusivity check and runs
    /// fire-and-forget, cleaning up its own container when the stream
    /// closes.
    pub async fn export(&self, req: &ExportRequest) -> CoreResult<JobStatus> {
        let train_config = self.store.read(&req.key)?;
        let name = req.key.container_name(JobKind::Export);
        self.replace_stale(&name).await?;

        self.launch(&name, &format!("{}:latest", train_config.model_type))
            .await?;
        self.spawn_exec(
            name,
            command::export_command(&train_config.model_type, &req.key),
        );

        Ok(JobStatus::Running)
    }

    fn job_spec(&self, name: &str, image: &str) -> RunSpec {
        RunSpec::new(name, image)
            .with_bind(self.layout.root().to_string_lossy(), CONTAINER_MOUNT)
            .with_all_gpus()
            .with_shm_size(self.config.shm_size)
    }

    async fn launch(&self, name: &str, image: &str) -> CoreResult<()> {
        self.runtime
            .create_and_start(&self.job_spec(name, image))
            .await
            .map_err(|err| CoreError::ContainerStartFailure {
                name: name.to_string(),
                reason: err.to_string(),
            })
    }

    /// Remove whatever currently holds the job's name. Prior runs are never
    /// resumed.
    async fn replace_stale(&self, name: &str) -> CoreResult<()> {
        match self.runtime.inspect_state(name).await? {
            ContainerState::Missing => Ok(()),
            state => {
                info!(container = name, ?state, "removing stale container");
                if state.is_running() {
                    if let Err(err) = self.runtime.stop(name).await {
                        debug!(container = name, error = %err, "stop of stale container");
                    }
                }
                self.runtime.remove(name).await?;
                Ok(())
            }
        }
    }

    /// Run the job command on a background task, draining its output, and
    /// tear the container down when the stream closes.
    fn spawn_exec(&self, name: String, cmd: Vec<String>) {
        let runtime = Arc::clone(&self.runtime);
        tokio::spawn(async move {
            if let Err(err) = runtime.exec_drain(&name, &cmd).await {
                warn!(container = %name, error = %err, "job exec failed");
            }
            if let Err(err) = runtime.stop(&name).await {
                debug!(container = %name, error = %err, "stop after exec");
            }
            if let Err(err) = runtime.remove(&name).await {
                warn!(container = %name, error = %err, "remove after exec failed");
            }
        });
    }
}
