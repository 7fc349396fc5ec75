use time::format_description::well_known::Rfc3339;
use time::UtcOffset;
use tracing::Subscriber;
use tracing_subscriber::fmt::time::OffsetTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use crate::logger::config::{LogFormat, LoggerConfig};
use crate::logger::error::LoggerError;

/// Install the global tracing subscriber described by `cfg`.
///
/// Call once at process start; a second call reports
/// [`LoggerError::AlreadyInitialized`].
pub fn init_logging(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = EnvFilter::try_new(&cfg.level)
        .map_err(|_| LoggerError::InvalidLevel(cfg.level.clone()))?;

    match cfg.format {
        LogFormat::Text => {
            let layer = fmt::layer()
                .with_ansi(cfg.use_color)
                .with_target(cfg.with_targets)
                .with_timer(timer());
            install(tracing_subscriber::registry().with(filter).with(layer))
        }
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(cfg.with_targets)
                .with_timer(timer());
            install(tracing_subscriber::registry().with(filter).with(layer))
        }
        LogFormat::Journald => init_journald(filter),
    }
}

fn timer() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

fn install<S>(subscriber: S) -> Result<(), LoggerError>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber.try_init().map_err(|err| {
        let text = err.to_string();
        if text.contains("SetGlobalDefaultError") {
            LoggerError::AlreadyInitialized
        } else {
            LoggerError::InitFailed(text)
        }
    })
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn init_journald(filter: EnvFilter) -> Result<(), LoggerError> {
    let layer = tracing_journald::layer()
        .map_err(|err| LoggerError::InitFailed(format!("journald: {err}")))?;
    install(tracing_subscriber::registry().with(filter).with(layer))
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn init_journald(_filter: EnvFilter) -> Result<(), LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_level_is_rejected_before_install() {
        let cfg = LoggerConfig {
            level: "not a directive ][".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            init_logging(&cfg),
            Err(LoggerError::InvalidLevel(_))
        ));
    }
}
