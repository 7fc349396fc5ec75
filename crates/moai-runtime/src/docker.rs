use std::collections::HashMap;

use async_trait::async_trait;
use bollard::Docker;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, KillContainerOptions,
    ListContainersOptions, RemoveContainerOptions, StartContainerOptions, StopContainerOptions,
};
use bollard::exec::{CreateExecOptions, StartExecOptions, StartExecResults};
use bollard::image::CreateImageOptions;
use bollard::models::{ContainerStateStatusEnum, DeviceRequest, HostConfig, PortBinding};
use futures::StreamExt;
use tracing::{debug, info, trace};

use crate::{
    ContainerBrief, ContainerRuntime, ContainerState, RunSpec, RuntimeError, RuntimeResult,
};

/// Seconds a graceful stop waits before the engine kills the process.
const STOP_GRACE_SECS: i64 = 10;

/// Docker-backed [`ContainerRuntime`].
pub struct DockerRuntime {
    docker: Docker,
}

impl DockerRuntime {
    /// Connect to the local engine socket.
    pub fn connect() -> RuntimeResult<Self> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;
        Ok(Self { docker })
    }

    async fn ensure_image(&self, image: &str) -> RuntimeResult<()> {
        if self.docker.inspect_image(image).await.is_ok() {
            return Ok(());
        }

        info!(image, "pulling image");
        let options = Some(CreateImageOptions {
            from_image: image.to_string(),
            ..Default::default()
        });
        let mut pull = self.docker.create_image(options, None, None);
        while let Some(progress) = pull.next().await {
            progress?;
        }
        Ok(())
    }

    fn build_config(spec: &RunSpec) -> Config<String> {
        let device_requests = spec.gpus.map(|count| {
            vec![DeviceRequest {
                count: Some(count),
                capabilities: Some(vec![vec!["gpu".to_string()]]),
                ..Default::default()
            }]
        });

        let (exposed_ports, port_bindings) = match spec.port {
            Some(mapping) => {
                let container_port = format!("{}/tcp", mapping.container);

                let mut bindings = HashMap::new();
                bindings.insert(
                    container_port.clone(),
                    Some(vec![PortBinding {
                        host_ip: None,
                        host_port: Some(mapping.host.to_string()),
                    }]),
                );

                let mut exposed = HashMap::new();
                exposed.insert(container_port, HashMap::new());

                (Some(exposed), Some(bindings))
            }
            None => (None, None),
        };

        let host_config = HostConfig {
            binds: (!spec.binds.is_empty()).then(|| spec.binds.clone()),
            device_requests,
            shm_size: spec.shm_size,
            port_bindings,
            ..Default::default()
        };

        Config {
            image: Some(spec.image.clone()),
            cmd: spec.command.clone(),
            tty: Some(true),
            open_stdin: Some(true),
            exposed_ports,
            host_config: Some(host_config),
            ..Default::default()
        }
    }
}

fn map_status(status: ContainerStateStatusEnum) -> ContainerState {
    match status {
        ContainerStateStatusEnum::CREATED => ContainerState::Created,
        ContainerStateStatusEnum::RUNNING => ContainerState::Running,
        ContainerStateStatusEnum::RESTARTING => ContainerState::Restarting,
        ContainerStateStatusEnum::PAUSED => ContainerState::Paused,
        ContainerStateStatusEnum::EXITED | ContainerStateStatusEnum::REMOVING => {
            ContainerState::Exited
        }
        ContainerStateStatusEnum::DEAD => ContainerState::Dead,
        _ => ContainerState::Missing,
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn list_running(&self) -> RuntimeResult<Vec<ContainerBrief>> {
        let summaries = self
            .docker
            .list_containers(Some(ListContainersOptions::<String> {
                all: false,
                ..Default::default()
            }))
            .await?;

        let briefs = summaries
            .into_iter()
            .filter_map(|summary| {
                // Engine names carry a leading slash.
                let name = summary
                    .names
                    .as_ref()?
                    .first()?
                    .trim_start_matches('/')
                    .to_string();
                let state = summary
                    .state
                    .as_deref()
                    .map(ContainerState::parse)
                    .unwrap_or(ContainerState::Running);
                Some(ContainerBrief { name, state })
            })
            .collect();

        Ok(briefs)
    }

    async fn inspect_state(&self, name: &str) -> RuntimeResult<ContainerState> {
        match self
            .docker
            .inspect_container(name, None::<InspectContainerOptions>)
            .await
        {
            Ok(inspect) => {
                let status = inspect
                    .state
                    .and_then(|state| state.status)
                    .unwrap_or(ContainerStateStatusEnum::EMPTY);
                Ok(map_status(status))
            }
            Err(err) => match RuntimeError::from(err) {
                RuntimeError::NotFound(_) => Ok(ContainerState::Missing),
                other => Err(other),
            },
        }
    }

    async fn create_and_start(&self, spec: &RunSpec) -> RuntimeResult<()> {
        self.ensure_image(&spec.image).await?;

        let options = CreateContainerOptions {
            name: spec.name.clone(),
            platform: None,
        };
        self.docker
            .create_container(Some(options), Self::build_config(spec))
            .await?;

        if let Err(err) = self
            .docker
            .start_container(&spec.name, None::<StartContainerOptions<String>>)
            .await
        {
            // A name must never be left behind by a failed launch.
            let _ = self
                .docker
                .remove_container(
                    &spec.name,
                    Some(RemoveContainerOptions {
                        force: true,
                        v: true,
                        ..Default::default()
                    }),
                )
                .await;
            return Err(err.into());
        }

        debug!(container = %spec.name, image = %spec.image, "container started");
        Ok(())
    }

    async fn exec_drain(&self, name: &str, cmd: &[String]) -> RuntimeResult<()> {
        let exec = self
            .docker
            .create_exec(
                name,
                CreateExecOptions {
                    cmd: Some(cmd.to_vec()),
                    attach_stdout: Some(true),
                    attach_stderr: Some(true),
                    ..Default::default()
                },
            )
            .await?;

        match self
            .docker
            .start_exec(&exec.id, None::<StartExecOptions>)
            .await?
        {
            StartExecResults::Attached { mut output, .. } => {
                while let Some(chunk) = output.next().await {
                    match chunk {
                        Ok(line) => {
                            trace!(target: "moai_runtime::exec", container = name, "{line}")
                        }
                        Err(err) => {
                            return Err(RuntimeError::Exec {
                                name: name.to_string(),
                                reason: err.to_string(),
                            });
                        }
                    }
                }
            }
            StartExecResults::Detached => {}
        }

        debug!(container = name, "exec stream closed");
        Ok(())
    }

    async fn stop(&self, name: &str) -> RuntimeResult<()> {
        self.docker
            .stop_container(name, Some(StopContainerOptions { t: STOP_GRACE_SECS }))
            .await?;
        Ok(())
    }

    async fn kill(&self, name: &str) -> RuntimeResult<()> {
        self.docker
            .kill_container(name, None::<KillContainerOptions<String>>)
            .await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> RuntimeResult<()> {
        match self
            .docker
            .remove_container(
                name,
                Some(RemoveContainerOptions {
                    force: true,
                    v: true,
                    ..Default::default()
                }),
            )
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => match RuntimeError::from(err) {
                RuntimeError::NotFound(_) => Ok(()),
                other => Err(other),
            },
        }
    }
}
