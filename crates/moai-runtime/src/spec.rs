/// Host-port to container-port binding for ancillary services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

impl PortMapping {
    /// Bind the same port number on both sides.
    pub fn same(port: u16) -> Self {
        Self {
            host: port,
            container: port,
        }
    }
}

/// Everything needed to create and start one job container.
///
/// Jobs always run detached with a TTY and open stdin; the fields here are
/// the parts that vary between kinds.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub name: String,
    pub image: String,
    /// Entrypoint override; `None` keeps the image default.
    pub command: Option<Vec<String>>,
    /// Volume binds in `host:container` form.
    pub binds: Vec<String>,
    /// GPU device count to request; `-1` requests every GPU on the host,
    /// `None` requests none.
    pub gpus: Option<i64>,
    /// Shared-memory size in bytes.
    pub shm_size: Option<i64>,
    pub port: Option<PortMapping>,
}

impl RunSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            command: None,
            binds: Vec::new(),
            gpus: None,
            shm_size: None,
            port: None,
        }
    }

    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = Some(command);
        self
    }

    pub fn with_bind(mut self, host: impl AsRef<str>, container: impl AsRef<str>) -> Self {
        self.binds
            .push(format!("{}:{}", host.as_ref(), container.as_ref()));
        self
    }

    pub fn with_all_gpus(mut self) -> Self {
        self.gpus = Some(-1);
        self
    }

    pub fn with_shm_size(mut self, bytes: i64) -> Self {
        self.shm_size = Some(bytes);
        self
    }

    pub fn with_port(mut self, port: PortMapping) -> Self {
        self.port = Some(port);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates() {
        let spec = RunSpec::new("p_s_t_v_train", "yolo:latest")
            .with_bind("/data/moai", "/moai")
            .with_all_gpus()
            .with_shm_size(32 * 1024 * 1024 * 1024)
            .with_command(vec!["python".into(), "train.py".into()]);

        assert_eq!(spec.binds, vec!["/data/moai:/moai"]);
        assert_eq!(spec.gpus, Some(-1));
        assert_eq!(spec.shm_size, Some(32 * 1024 * 1024 * 1024));
        assert!(spec.port.is_none());
        assert_eq!(spec.command.as_ref().unwrap()[1], "train.py");
    }

    #[test]
    fn same_port_mapping() {
        let port = PortMapping::same(50000);
        assert_eq!(port.host, 50000);
        assert_eq!(port.container, 50000);
    }
}
