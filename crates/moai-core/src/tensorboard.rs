use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use moai_model::{JobKey, JobKind};
use moai_runtime::{ContainerRuntime, ContainerState, PortMapping, RunSpec};

use crate::{
    CONTAINER_MOUNT, CoreError, CoreResult, MountLayout, PortRange, ProbeConfig, StopOutcome,
    command, ports,
};

#[derive(Debug, Clone)]
pub struct TensorboardConfig {
    pub image: String,
    pub range: PortRange,
    pub probe: ProbeConfig,
}

impl Default for TensorboardConfig {
    fn default() -> Self {
        Self {
            image: "moai_tensorboard:latest".to_string(),
            range: PortRange::default(),
            probe: ProbeConfig::default(),
        }
    }
}

/// Launches and stops TensorBoard containers.
///
/// TensorBoard is ancillary — it bypasses the exclusivity guard — but it
/// owns a host-port lease: one board per JobKey, allocated bind-then-retry
/// and verified live before it is reported to the caller.
pub struct TensorboardManager<R> {
    runtime: Arc<R>,
    layout: MountLayout,
    config: TensorboardConfig,
}

impl<R: ContainerRuntime + 'static> TensorboardManager<R> {
    pub fn new(runtime: Arc<R>, layout: MountLayout, config: TensorboardConfig) -> Self {
        Self {
            runtime,
            layout,
            config,
        }
    }

    /// Start a TensorBoard container for the key and return its host port.
    pub async fn launch(&self, key: &JobKey, cancel: &CancellationToken) -> CoreResult<u16> {
        let name = key.container_name(JobKind::Tensorboard);

        match self.runtime.inspect_state(&name).await? {
            ContainerState::Missing => {}
            state if state.is_live() => return Err(CoreError::AlreadyActive(name)),
            _ => {
                // A dead board from an earlier run still holds the name.
                self.runtime.remove(&name).await?;
            }
        }

        let logdir = self.layout.container_logdir(key);
        let port = ports::allocate(&self.config.range, |candidate| {
            let runtime = Arc::clone(&self.runtime);
            let spec = self.board_spec(&name, &logdir, candidate);
            async move { runtime.create_and_start(&spec).await }
        })
        .await?;

        info!(container = %name, port, "tensorboard container started");

        if let Err(err) = ports::probe_http(port, &self.config.probe, cancel).await {
            // Bound but never served: tear it down so the port lease dies
            // with the container.
            let _ = self.runtime.kill(&name).await;
            let _ = self.runtime.remove(&name).await;
            return Err(err);
        }

        Ok(port)
    }

    /// Stop the key's TensorBoard container, if any.
    pub async fn stop(&self, key: &JobKey) -> CoreResult<StopOutcome> {
        let name = key.container_name(JobKind::Tensorboard);
        match self.runtime.inspect_state(&name).await? {
            ContainerState::Missing => Ok(StopOutcome::NothingToStop),
            state => {
                if state.is_running() {
                    let _ = self.runtime.kill(&name).await;
                }
                self.runtime.remove(&name).await?;
                info!(container = %name, "tensorboard container removed");
                Ok(StopOutcome::Stopped { container: name })
            }
        }
    }

    fn board_spec(&self, name: &str, logdir: &str, port: u16) -> RunSpec {
        RunSpec::new(name, &self.config.image)
            .with_bind(self.layout.root().to_string_lossy(), CONTAINER_MOUNT)
            .with_port(PortMapping::same(port))
            .with_command(command::tensorboard_command(logdir, port))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockRuntime;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn key() -> JobKey {
        JobKey::new("proj", "sub", "detect", "v1")
    }

    fn config(range: PortRange, probe: ProbeConfig) -> TensorboardConfig {
        TensorboardConfig {
            image: "moai_tensorboard:latest".into(),
            range,
            probe,
        }
    }

    /// Serve a TensorBoard-looking page on an OS-assigned port.
    async fn serve_board_page() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                tokio::spawn(async move {
                    let mut buf = [0u8; 1024];
                    let _ = socket.read(&mut buf).await;
                    let body = "<html><title>TensorBoard</title></html>";
                    let response = format!(
                        "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                });
            }
        });
        port
    }

    #[tokio::test]
    async fn launch_allocates_first_free_port_and_probes_it() {
        let dir = TempDir::new().unwrap();
        let page_port = serve_board_page().await;

        // Pretend every port below the live one is taken.
        let runtime = Arc::new(
            MockRuntime::new().with_busy_ports((page_port - 3)..page_port),
        );
        let manager = TensorboardManager::new(
            Arc::clone(&runtime),
            MountLayout::new(dir.path()),
            config(
                PortRange::new(page_port - 3, page_port),
                ProbeConfig {
                    attempts: 5,
                    interval: Duration::from_millis(10),
                    ..Default::default()
                },
            ),
        );

        let port = manager.launch(&key(), &CancellationToken::new()).await.unwrap();
        assert_eq!(port, page_port);

        let name = key().container_name(JobKind::Tensorboard);
        assert!(runtime.exists(&name));
    }

    #[tokio::test]
    async fn exhausted_range_reports_port_exhausted() {
        let dir = TempDir::new().unwrap();
        let runtime = Arc::new(MockRuntime::new().with_busy_ports(50000..=50002));
        let manager = TensorboardManager::new(
            Arc::clone(&runtime),
            MountLayout::new(dir.path()),
            config(PortRange::new(50000, 50002), ProbeConfig::default()),
        );

        let err = manager
            .launch(&key(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::PortExhausted { .. }));
    }

    #[tokio::test]
    async fn dead_probe_tears_the_container_down() {
        let dir = TempDir::new().unwrap();
        // Nothing listens on the allocated port.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let runtime = Arc::new(MockRuntime::new());
        let manager = TensorboardManager::new(
            Arc::clone(&runtime),
            MountLayout::new(dir.path()),
            config(
                PortRange::new(port, port),
                ProbeConfig {
                    attempts: 2,
                    interval: Duration::from_millis(10),
                    ..Default::default()
                },
            ),
        );

        let err = manager
            .launch(&key(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ServiceNotReady(_)));

        let name = key().container_name(JobKind::Tensorboard);
        assert!(!runtime.exists(&name), "dead board must be torn down");
    }

    #[tokio::test]
    async fn live_board_for_the_same_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let name = key().container_name(JobKind::Tensorboard);
        let runtime = Arc::new(MockRuntime::new().with_container(&name, ContainerState::Running));
        let manager = TensorboardManager::new(
            Arc::clone(&runtime),
            MountLayout::new(dir.path()),
            TensorboardConfig::default(),
        );

        let err = manager
            .launch(&key(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::AlreadyActive(n) if n == name));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let name = key().container_name(JobKind::Tensorboard);
        let runtime = Arc::new(MockRuntime::new().with_container(&name, ContainerState::Running));
        let manager = TensorboardManager::new(
            Arc::clone(&runtime),
            MountLayout::new(dir.path()),
            TensorboardConfig::default(),
        );

        let outcome = manager.stop(&key()).await.unwrap();
        assert_eq!(outcome, StopOutcome::Stopped { container: name });

        let outcome = manager.stop(&key()).await.unwrap();
        assert_eq!(outcome, StopOutcome::NothingToStop);
    }
}
