//! Host-port allocation and service liveness for ancillary containers.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use moai_runtime::{RuntimeError, RuntimeResult};

use crate::{CoreError, CoreResult};

/// Inclusive range of host ports to try for ancillary services.
#[derive(Debug, Clone, Copy)]
pub struct PortRange {
    pub start: u16,
    pub end: u16,
}

impl PortRange {
    pub fn new(start: u16, end: u16) -> Self {
        Self { start, end }
    }

    pub fn iter(&self) -> impl Iterator<Item = u16> + use<> {
        self.start..=self.end
    }
}

impl Default for PortRange {
    fn default() -> Self {
        Self {
            start: 50000,
            end: 50999,
        }
    }
}

/// Liveness-probe tuning.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub attempts: u32,
    pub interval: Duration,
    /// Substring the service's landing page must contain to count as live.
    pub marker: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            attempts: 60,
            interval: Duration::from_secs(1),
            marker: "TensorBoard".to_string(),
        }
    }
}

/// Find a free port by attempting to bind each candidate in ascending
/// order.
///
/// `bind` is the actual bind attempt (container creation with the port
/// mapped); a [`RuntimeError::PortAllocated`] answer advances to the next
/// candidate. There is no pre-scan of existing bindings — the engine's
/// atomic bind failure makes bind-then-retry equivalent to check-then-act
/// without the race. Running out of candidates is
/// [`CoreError::PortExhausted`].
pub async fn allocate<F, Fut>(range: &PortRange, mut bind: F) -> CoreResult<u16>
where
    F: FnMut(u16) -> Fut,
    Fut: Future<Output = RuntimeResult<()>>,
{
    for port in range.iter() {
        match bind(port).await {
            Ok(()) => {
                debug!(port, "host port bound");
                return Ok(port);
            }
            Err(RuntimeError::PortAllocated) => {
                debug!(port, "host port taken, trying next");
            }
            Err(other) => return Err(other.into()),
        }
    }

    warn!(start = range.start, end = range.end, "port range exhausted");
    Err(CoreError::PortExhausted {
        start: range.start,
        end: range.end,
    })
}

/// Probe a freshly bound service until it serves a page containing the
/// expected marker.
///
/// Exhausting the attempts is [`CoreError::ServiceNotReady`] — a different
/// failure than port exhaustion, and the caller is expected to tear the
/// container down.
pub async fn probe_http(
    port: u16,
    probe: &ProbeConfig,
    cancel: &CancellationToken,
) -> CoreResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()
        .map_err(|err| {
            warn!(error = %err, "probe client construction failed");
            CoreError::ServiceNotReady(port)
        })?;
    let url = format!("http://localhost:{port}");

    for attempt in 1..=probe.attempts {
        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let body = response.text().await.unwrap_or_default();
                if body.contains(&probe.marker) {
                    info!(port, attempt, "service is live");
                    return Ok(());
                }
                trace!(port, attempt, "response missing marker");
            }
            Ok(response) => {
                trace!(port, attempt, status = %response.status(), "service not ready yet");
            }
            Err(err) => {
                trace!(port, attempt, error = %err, "probe request failed");
            }
        }

        tokio::select! {
            _ = sleep(probe.interval) => {}
            _ = cancel.cancelled() => {
                return Err(CoreError::Cancelled(format!("liveness probe of port {port}")));
            }
        }
    }

    Err(CoreError::ServiceNotReady(port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn allocate_skips_taken_ports() {
        let taken: HashSet<u16> = [50000, 50001, 50002].into();
        let range = PortRange::new(50000, 50010);

        let port = allocate(&range, |candidate| {
            let taken = taken.clone();
            async move {
                if taken.contains(&candidate) {
                    Err(RuntimeError::PortAllocated)
                } else {
                    Ok(())
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(port, 50003);
    }

    #[tokio::test]
    async fn allocate_reports_exhaustion() {
        let range = PortRange::new(50000, 50002);

        let err = allocate(&range, |_| async { Err(RuntimeError::PortAllocated) })
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CoreError::PortExhausted {
                start: 50000,
                end: 50002
            }
        ));
    }

    #[tokio::test]
    async fn allocate_propagates_other_bind_failures() {
        let range = PortRange::new(50000, 50002);

        let err = allocate(&range, |_| async {
            Err(RuntimeError::Api("engine exploded".into()))
        })
        .await
        .unwrap_err();

        assert!(matches!(err, CoreError::Runtime(_)));
    }

    /// Minimal HTTP server answering every request with the given body.
    async fn serve_body(body: &'static str) -> u16 {
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
    async fn probe_succeeds_on_marker() {
        let port = serve_body("<html>TensorBoard UI</html>").await;
        let probe = ProbeConfig {
            attempts: 5,
            interval: Duration::from_millis(10),
            ..Default::default()
        };

        probe_http(port, &probe, &CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn probe_fails_without_marker() {
        let port = serve_body("<html>something else</html>").await;
        let probe = ProbeConfig {
            attempts: 3,
            interval: Duration::from_millis(10),
            ..Default::default()
        };

        let err = probe_http(port, &probe, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ServiceNotReady(p) if p == port));
    }

    #[tokio::test]
    async fn probe_fails_when_nothing_listens() {
        // Bind then drop to get a port that is almost certainly closed.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let probe = ProbeConfig {
            attempts: 2,
            interval: Duration::from_millis(10),
            ..Default::default()
        };

        let err = probe_http(port, &probe, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ServiceNotReady(_)));
    }
}
