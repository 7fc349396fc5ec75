use async_trait::async_trait;

use crate::{ContainerBrief, ContainerState, RunSpec, RuntimeResult};

/// Thin seam over the container engine.
///
/// The engine's own container list is the single source of truth for what
/// is running; callers re-query through this trait instead of caching.
/// Containers are addressed exclusively by name.
#[async_trait]
pub trait ContainerRuntime: Send + Sync {
    /// List containers that are currently in a non-exited state.
    async fn list_running(&self) -> RuntimeResult<Vec<ContainerBrief>>;

    /// Report the state of the named container; [`ContainerState::Missing`]
    /// rather than an error when no such container exists.
    async fn inspect_state(&self, name: &str) -> RuntimeResult<ContainerState>;

    /// Create and start a container from the spec.
    ///
    /// If starting fails after creation succeeded, the half-created
    /// container is force-removed before the error is returned — a failed
    /// launch never leaves a name behind.
    async fn create_and_start(&self, spec: &RunSpec) -> RuntimeResult<()>;

    /// Run a command inside a running container, draining its combined
    /// output stream into the log until the stream closes.
    ///
    /// Returning `Ok` means the stream ended, i.e. the command's process
    /// terminated.
    async fn exec_drain(&self, name: &str, cmd: &[String]) -> RuntimeResult<()>;

    /// Gracefully stop the named container.
    async fn stop(&self, name: &str) -> RuntimeResult<()>;

    /// Kill the named container immediately.
    async fn kill(&self, name: &str) -> RuntimeResult<()>;

    /// Force-remove the named container and its anonymous volumes.
    ///
    /// Removing a container that does not exist is a success; remove is the
    /// idempotent tail of every cleanup path.
    async fn remove(&self, name: &str) -> RuntimeResult<()>;
}
