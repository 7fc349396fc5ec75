use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::info;

use moai_api::{CoreAdapter, HttpApi};
use moai_core::{JobConfig, MountLayout, TensorboardConfig};
use moai_observe::{LoggerConfig, init_logging};
use moai_runtime::DockerRuntime;

mod config;
use config::AgentConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging(&LoggerConfig::from_env()?)?;

    let cfg = AgentConfig::from_env()?;
    info!(bind = %cfg.bind, mount = %cfg.mount.display(), "starting moai agent");

    let runtime =
        Arc::new(DockerRuntime::connect().context("connecting to the container engine")?);

    // Cancelled on shutdown; aborts in-flight artifact polls and probes.
    let shutdown = CancellationToken::new();

    let tensorboard = TensorboardConfig {
        image: cfg.tensorboard_image.clone(),
        range: cfg.port_range,
        ..Default::default()
    };
    let handler = CoreAdapter::new(
        runtime,
        MountLayout::new(&cfg.mount),
        JobConfig::default(),
        tensorboard,
        shutdown.clone(),
    );
    let app = HttpApi::new(Arc::new(handler)).router();

    let listener = tokio::net::TcpListener::bind(cfg.bind)
        .await
        .with_context(|| format!("binding {}", cfg.bind))?;
    info!("listening on {}", cfg.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(shutdown))
        .await?;

    info!("agent stopped");
    Ok(())
}

async fn wait_for_shutdown(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown requested");
    }
    cancel.cancel();
}
