use thiserror::Error;

pub type RuntimeResult<T> = Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The engine socket could not be reached at all.
    #[error("container runtime unavailable: {0}")]
    Unavailable(String),

    #[error("container not found: {0}")]
    NotFound(String),

    /// The engine rejected a bind because the host port is taken.
    ///
    /// Surfaced as its own variant so port allocation can advance to the
    /// next candidate instead of failing the launch.
    #[error("host port already allocated")]
    PortAllocated,

    #[error("exec in container {name} failed: {reason}")]
    Exec { name: String, reason: String },

    #[error("container runtime error: {0}")]
    Api(String),
}

impl From<bollard::errors::Error> for RuntimeError {
    fn from(err: bollard::errors::Error) -> Self {
        use bollard::errors::Error as Docker;

        match err {
            Docker::DockerResponseServerError {
                status_code: 404,
                message,
            } => RuntimeError::NotFound(message),
            Docker::DockerResponseServerError { message, .. }
                if message.contains("port is already allocated") =>
            {
                RuntimeError::PortAllocated
            }
            other => RuntimeError::Api(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server_error(status_code: u16, message: &str) -> bollard::errors::Error {
        bollard::errors::Error::DockerResponseServerError {
            status_code,
            message: message.to_string(),
        }
    }

    #[test]
    fn missing_container_maps_to_not_found() {
        let err: RuntimeError = server_error(404, "No such container: x").into();
        assert!(matches!(err, RuntimeError::NotFound(_)));
    }

    #[test]
    fn port_conflict_is_classified() {
        let err: RuntimeError =
            server_error(500, "driver failed: Bind for 0.0.0.0:50000 failed: port is already allocated").into();
        assert!(matches!(err, RuntimeError::PortAllocated));
    }

    #[test]
    fn other_server_errors_stay_generic() {
        let err: RuntimeError = server_error(500, "something else").into();
        assert!(matches!(err, RuntimeError::Api(_)));
    }
}
