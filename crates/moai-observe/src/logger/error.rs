use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("invalid log format: {0} (expected: text|json|journald)")]
    InvalidFormat(String),
    #[error("invalid log level: {0}")]
    InvalidLevel(String),
    #[error("journald output is not available on this platform or build")]
    JournaldNotSupported,
    #[error("logger already initialized")]
    AlreadyInitialized,
    #[error("logger initialization failed: {0}")]
    InitFailed(String),
}
