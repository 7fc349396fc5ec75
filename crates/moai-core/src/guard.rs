use tracing::{debug, warn};

use moai_model::{JobKind, is_ancillary_name};
use moai_runtime::ContainerRuntime;

use crate::{CoreError, CoreResult};

/// Decide whether a job of `kind` may start right now.
///
/// Exclusive kinds (train/inference) are refused while any non-ancillary
/// container is alive; ancillary kinds always pass. The decision is made
/// against a fresh container listing every time — nothing is cached — and a
/// failed listing refuses the launch rather than risk double-booking the
/// GPU.
///
/// The check alone is not atomic with the container creation that follows
/// it; callers that need the pair to be exclusive hold the
/// [`JobManager`](crate::JobManager) launch gate across both.
pub async fn check_exclusive(runtime: &dyn ContainerRuntime, kind: JobKind) -> CoreResult<()> {
    if !kind.is_exclusive() {
        return Ok(());
    }

    let running = match runtime.list_running().await {
        Ok(running) => running,
        Err(err) => {
            warn!(error = %err, "container listing failed; refusing exclusive launch");
            return Err(CoreError::ResourceBusy(format!(
                "container list unavailable: {err}"
            )));
        }
    };

    if let Some(holder) = running
        .iter()
        .find(|c| c.state.is_live() && !is_ancillary_name(&c.name))
    {
        debug!(kind = kind.suffix(), holder = %holder.name, "exclusive launch refused");
        return Err(CoreError::ResourceBusy(holder.name.clone()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockRuntime;
    use moai_runtime::ContainerState;

    #[tokio::test]
    async fn idle_host_admits_exclusive_kinds() {
        let runtime = MockRuntime::new();
        check_exclusive(&runtime, JobKind::Train).await.unwrap();
        check_exclusive(&runtime, JobKind::Inference).await.unwrap();
    }

    #[tokio::test]
    async fn running_train_blocks_any_exclusive_launch() {
        let runtime =
            MockRuntime::new().with_container("p_s_t_v1_train", ContainerState::Running);

        let err = check_exclusive(&runtime, JobKind::Train).await.unwrap_err();
        assert!(matches!(err, CoreError::ResourceBusy(name) if name == "p_s_t_v1_train"));

        let err = check_exclusive(&runtime, JobKind::Inference)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ResourceBusy(_)));
    }

    #[tokio::test]
    async fn ancillary_containers_do_not_block() {
        let runtime = MockRuntime::new()
            .with_container("p_s_t_v1_export", ContainerState::Running)
            .with_container("p_s_t_v1_tensorboard", ContainerState::Running);

        check_exclusive(&runtime, JobKind::Train).await.unwrap();
        check_exclusive(&runtime, JobKind::Inference).await.unwrap();
    }

    #[tokio::test]
    async fn ancillary_kinds_always_pass() {
        let runtime =
            MockRuntime::new().with_container("p_s_t_v1_train", ContainerState::Running);

        check_exclusive(&runtime, JobKind::Export).await.unwrap();
        check_exclusive(&runtime, JobKind::Tensorboard).await.unwrap();
    }

    #[tokio::test]
    async fn listing_failure_fails_closed() {
        let runtime = MockRuntime::new().fail_listing();

        let err = check_exclusive(&runtime, JobKind::Train).await.unwrap_err();
        assert!(matches!(err, CoreError::ResourceBusy(_)));

        // Ancillary kinds never consult the listing.
        check_exclusive(&runtime, JobKind::Export).await.unwrap();
    }
}
