use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

use moai_core::PortRange;

/// Daemon configuration, assembled from environment variables over
/// defaults.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// HTTP listen address (`MOAI_BIND`).
    pub bind: SocketAddr,
    /// Host path of the shared volume (`MOAI_MOUNT`).
    pub mount: PathBuf,
    /// TensorBoard container image (`MOAI_TENSORBOARD_IMAGE`).
    pub tensorboard_image: String,
    /// Host-port range for TensorBoard (`MOAI_PORT_RANGE`, `START-END`).
    pub port_range: PortRange,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8000)),
            mount: PathBuf::from("/moai"),
            tensorboard_image: "moai_tensorboard:latest".to_string(),
            port_range: PortRange::default(),
        }
    }
}

impl AgentConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let mut cfg = Self::default();

        if let Ok(bind) = std::env::var("MOAI_BIND") {
            cfg.bind = bind
                .parse()
                .with_context(|| format!("invalid MOAI_BIND: {bind}"))?;
        }
        if let Ok(mount) = std::env::var("MOAI_MOUNT") {
            cfg.mount = PathBuf::from(mount);
        }
        if let Ok(image) = std::env::var("MOAI_TENSORBOARD_IMAGE") {
            cfg.tensorboard_image = image;
        }
        if let Ok(range) = std::env::var("MOAI_PORT_RANGE") {
            cfg.port_range = parse_port_range(&range)
                .with_context(|| format!("invalid MOAI_PORT_RANGE: {range}"))?;
        }

        Ok(cfg)
    }
}

fn parse_port_range(s: &str) -> anyhow::Result<PortRange> {
    let Some((start, end)) = s.split_once('-') else {
        bail!("expected START-END");
    };
    let start: u16 = start.trim().parse().context("invalid start port")?;
    let end: u16 = end.trim().parse().context("invalid end port")?;
    if start > end {
        bail!("start port above end port");
    }
    Ok(PortRange::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_range() {
        let range = parse_port_range("50000-50999").unwrap();
        assert_eq!(range.start, 50000);
        assert_eq!(range.end, 50999);
    }

    #[test]
    fn reject_malformed_ranges() {
        assert!(parse_port_range("50000").is_err());
        assert!(parse_port_range("x-y").is_err());
        assert!(parse_port_range("50010-50000").is_err());
    }

    #[test]
    fn defaults_are_sane() {
        let cfg = AgentConfig::default();
        assert_eq!(cfg.bind.port(), 8000);
        assert_eq!(cfg.mount, PathBuf::from("/moai"));
        assert_eq!(cfg.port_range.start, 50000);
    }
}
