use std::fs;
use std::io;
use std::sync::Arc;
use std::sync::Mutex;

use tracing::{debug, info};

use moai_model::{JobKey, JobKind};
use moai_runtime::{ContainerRuntime, ContainerState};

use crate::{CoreError, CoreResult, MountLayout};

/// Two stop requests must not interleave a half-moved weights directory;
/// one process-wide lock serializes the move.
static RELOCATE_LOCK: Mutex<()> = Mutex::new(());

/// Result of a stop request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped { container: String },
    /// No matching container existed; stop is safe to call speculatively.
    NothingToStop,
}

/// Stops whatever exclusive job is active for a key.
///
/// A job is addressed without knowing in advance which kind is active: the
/// train name is tried first, then inference. The absent case is a benign
/// no-op, never an error.
pub struct StopCoordinator<R> {
    runtime: Arc<R>,
    layout: MountLayout,
}

impl<R: ContainerRuntime> StopCoordinator<R> {
    pub fn new(runtime: Arc<R>, layout: MountLayout) -> Self {
        Self { runtime, layout }
    }

    pub async fn stop(&self, key: &JobKey) -> CoreResult<StopOutcome> {
        for kind in [JobKind::Train, JobKind::Inference] {
            let name = key.container_name(kind);
            let state = self.runtime.inspect_state(&name).await?;
            if state == ContainerState::Missing {
                continue;
            }

            info!(container = %name, ?state, "stopping job");
            if state.is_running() {
                if let Err(err) = self.runtime.kill(&name).await {
                    debug!(container = %name, error = %err, "kill during stop");
                }
            }

            if kind == JobKind::Train {
                // A killed training run may leave weights mid-write in the
                // in-progress directory; rescue them before the container
                // (and the operator's attention) goes away.
                relocate_weights(&self.layout, key)?;
            }

            self.runtime.remove(&name).await?;
            return Ok(StopOutcome::Stopped { container: name });
        }

        debug!(key = %key, "nothing to stop");
        Ok(StopOutcome::NothingToStop)
    }
}

/// Move weight files out of the in-progress directory into the final
/// weights directory.
///
/// Idempotent: a missing or empty in-progress directory is a no-op, and
/// the process-wide lock keeps concurrent calls from observing a partial
/// move.
pub fn relocate_weights(layout: &MountLayout, key: &JobKey) -> CoreResult<()> {
    let _guard = RELOCATE_LOCK
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    let src = layout.in_progress_dir(key);
    let entries = match fs::read_dir(&src) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(err) => return Err(relocate_error(key, err)),
    };

    let dst_dir = layout.weights_dir(key);
    fs::create_dir_all(&dst_dir).map_err(|err| relocate_error(key, err))?;

    for entry in entries {
        let entry = entry.map_err(|err| relocate_error(key, err))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let dst = dst_dir.join(file_name);
        fs::rename(&path, &dst).map_err(|err| relocate_error(key, err))?;
        info!(from = %path.display(), to = %dst.display(), "relocated weight artifact");
    }

    Ok(())
}

fn relocate_error(key: &JobKey, err: impl std::fmt::Display) -> CoreError {
    CoreError::Relocation {
        key: key.to_string(),
        reason: err.to_string(),
    }
}
