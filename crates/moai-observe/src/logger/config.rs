use std::str::FromStr;

use crate::logger::error::LoggerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
    Journald,
}

impl FromStr for LogFormat {
    type Err = LoggerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "journald" | "journal" => {
                #[cfg(all(target_os = "linux", feature = "journald"))]
                {
                    Ok(LogFormat::Journald)
                }

                #[cfg(not(all(target_os = "linux", feature = "journald")))]
                {
                    Err(LoggerError::JournaldNotSupported)
                }
            }
            _ => Err(LoggerError::InvalidFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LogFormat,
    /// An `EnvFilter` directive, e.g. `"info"` or `"moai_core=debug"`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color: cfg!(test) || atty::is(atty::Stream::Stdout),
        }
    }
}

impl LoggerConfig {
    /// Build from `MOAI_LOG_LEVEL` / `MOAI_LOG_FORMAT`, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Result<Self, LoggerError> {
        let mut cfg = Self::default();
        if let Ok(level) = std::env::var("MOAI_LOG_LEVEL") {
            cfg.level = level;
        }
        if let Ok(format) = std::env::var("MOAI_LOG_FORMAT") {
            cfg.format = format.parse()?;
        }
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_text_and_json() {
        assert_eq!("text".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("JSON".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(" Text ".parse::<LogFormat>().unwrap(), LogFormat::Text);
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(matches!(
            "xml".parse::<LogFormat>(),
            Err(LoggerError::InvalidFormat(_))
        ));
    }

    #[cfg(not(feature = "journald"))]
    #[test]
    fn journald_is_rejected_without_the_feature() {
        assert!(matches!(
            "journald".parse::<LogFormat>(),
            Err(LoggerError::JournaldNotSupported)
        ));
    }

    #[test]
    fn default_level_is_info() {
        assert_eq!(LoggerConfig::default().level, "info");
    }
}
