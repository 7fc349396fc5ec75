mod config;
mod error;
mod init;

pub use config::{LogFormat, LoggerConfig};
pub use error::LoggerError;
pub use init::init_logging;
