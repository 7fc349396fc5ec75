//! Completion detection.
//!
//! Two strategies exist, chosen by job kind:
//!
//! - **Stream drain** (inference, export): the exec output stream closing is
//!   the completion signal. That path is
//!   [`ContainerRuntime::exec_drain`](moai_runtime::ContainerRuntime::exec_drain)
//!   itself; nothing extra lives here.
//! - **Artifact poll** (train): the training process's exit does not
//!   reliably coincide with "results are ready", so completion is the
//!   appearance of the results file on the shared volume, checked on a
//!   fixed interval under a bounded timeout.

use std::path::Path;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use moai_runtime::ContainerRuntime;

use crate::{CoreError, CoreResult};

/// Artifact-poll tuning.
#[derive(Debug, Clone)]
pub struct ArtifactPoll {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for ArtifactPoll {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Wait for the training artifact to appear.
///
/// Each round checks the artifact first, then the container's live state:
/// a container that exited without producing the artifact will never
/// produce it, so that fails fast as [`CoreError::ArtifactProcessExited`]
/// instead of waiting out the timeout. Reaching the timeout without the
/// artifact is [`CoreError::ArtifactTimeout`]. Cancelling `cancel` aborts
/// the wait between polls.
pub async fn wait_for_artifact(
    runtime: &dyn ContainerRuntime,
    name: &str,
    artifact: &Path,
    poll: &ArtifactPoll,
    cancel: &CancellationToken,
) -> CoreResult<()> {
    let deadline = Instant::now() + poll.timeout;

    loop {
        trace!(container = name, path = %artifact.display(), "polling for results artifact");
        if artifact.exists() {
            debug!(container = name, "results artifact found");
            return Ok(());
        }

        let state = runtime.inspect_state(name).await?;
        if !state.is_live() {
            return Err(CoreError::ArtifactProcessExited(name.to_string()));
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(CoreError::ArtifactTimeout {
                name: name.to_string(),
                timeout_secs: poll.timeout.as_secs(),
            });
        }

        let step = poll.interval.min(deadline - now);
        tokio::select! {
            _ = sleep(step) => {}
            _ = cancel.cancelled() => {
                return Err(CoreError::Cancelled(name.to_string()));
            }
        }
    }
}
