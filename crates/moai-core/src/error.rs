use thiserror::Error;

use moai_runtime::RuntimeError;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    /// An exclusive launch was refused. Carries the name of the container
    /// holding the host, or the reason the container list was unavailable
    /// (listing failures refuse the launch rather than risk double-booking
    /// the GPU).
    #[error("resource busy: {0}")]
    ResourceBusy(String),

    #[error("failed to start container {name}: {reason}")]
    ContainerStartFailure { name: String, reason: String },

    /// The training results artifact did not appear within the bound.
    #[error("results for {name} did not appear within {timeout_secs}s")]
    ArtifactTimeout { name: String, timeout_secs: u64 },

    /// The training container exited before its results artifact appeared.
    #[error("container {0} exited before producing results")]
    ArtifactProcessExited(String),

    #[error("no free port in range {start}-{end}")]
    PortExhausted { start: u16, end: u16 },

    /// A port was bound but the service behind it never answered the
    /// liveness probe.
    #[error("service on port {0} never became ready")]
    ServiceNotReady(u16),

    #[error("{0} not found")]
    NotFound(String),

    #[error("tensorboard already active: {0}")]
    AlreadyActive(String),

    #[error("{0} was cancelled")]
    Cancelled(String),

    #[error("train config for {key}: {reason}")]
    TrainConfig { key: String, reason: String },

    #[error("weight relocation for {key} failed: {reason}")]
    Relocation { key: String, reason: String },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
