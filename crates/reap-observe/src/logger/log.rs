use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, fmt::time::OffsetTime, layer::SubscriberExt,
    util::{SubscriberInitExt, TryInitError},
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Build the output layer for `cfg.format`, filtered by `cfg.level`, and
/// install it as the global subscriber.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = cfg.level.to_filter()?;
    let layer = match cfg.format {
        LoggerFormat::Text => text_layer(cfg, filter),
        LoggerFormat::Json => json_layer(cfg, filter),
        LoggerFormat::Journald => journald_layer(filter)?,
    };
    tracing_subscriber::registry()
        .with(layer)
        .try_init()
        .map_err(init_error)
}

fn text_layer(cfg: &LoggerConfig, filter: EnvFilter) -> BoxedLayer {
    fmt::layer()
        .with_ansi(cfg.use_color)
        .with_target(cfg.with_targets)
        .with_timer(local_rfc3339())
        .with_filter(filter)
        .boxed()
}

fn json_layer(cfg: &LoggerConfig, filter: EnvFilter) -> BoxedLayer {
    fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(cfg.with_targets)
        .with_current_span(true)
        .with_timer(local_rfc3339())
        .with_filter(filter)
        .boxed()
}

/// Timestamps in the host's local offset; UTC when the offset is unknowable
/// (e.g. a multi-threaded process on some platforms).
fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

fn init_error(e: TryInitError) -> LoggerError {
    let msg = e.to_string();
    if msg.contains("already been set") || msg.contains("already initialized") {
        LoggerError::AlreadyInitialized
    } else {
        LoggerError::InitializationFailed(msg)
    }
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn journald_layer(filter: EnvFilter) -> Result<BoxedLayer, LoggerError> {
    let layer = tracing_journald::layer()
        .map_err(|e| LoggerError::InitializationFailed(format!("journald: {e}")))?;
    Ok(layer.with_filter(filter).boxed())
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn journald_layer(_filter: EnvFilter) -> Result<BoxedLayer, LoggerError> {
    Err(LoggerError::JournaldNotSupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(all(target_os = "linux", feature = "journald")))]
    #[test]
    fn journald_without_feature_is_rejected_before_install() {
        let cfg = LoggerConfig {
            format: LoggerFormat::Journald,
            ..Default::default()
        };
        assert!(matches!(install(&cfg), Err(LoggerError::JournaldNotSupported)));
    }

    #[test]
    fn second_install_reports_already_initialized() {
        let cfg = LoggerConfig {
            format: LoggerFormat::Json,
            ..Default::default()
        };
        // Another test in this binary may have won the race; either way the
        // global default is set after the first call.
        let _ = install(&cfg);
        assert!(matches!(install(&cfg), Err(LoggerError::AlreadyInitialized)));
    }
}
