use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing::Subscriber;
use tracing_subscriber::{
    EnvFilter, Layer, fmt, fmt::time::OffsetTime, layer::SubscriberExt, registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

type BoxedLayer<S> = Box<dyn Layer<S> + Send + Sync + 'static>;

/// Builds the filter and the output layer for `cfg` and installs them globally.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let filter = mk_filter(&cfg.level)?;
    let output = mk_output(cfg)?;

    tracing_subscriber::registry()
        .with(output.with_filter(filter))
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

fn mk_output<S>(cfg: &LoggerConfig) -> Result<BoxedLayer<S>, LoggerError>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = match cfg.format {
        LoggerFormat::Text => fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(cfg.use_color)
            .with_target(cfg.with_targets)
            .with_timer(mk_timer())
            .boxed(),
        LoggerFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_ansi(false)
            .with_target(cfg.with_targets)
            .with_timer(mk_timer())
            .boxed(),
        LoggerFormat::Journald => mk_journald()?,
    };
    Ok(layer)
}

pub(crate) fn mk_filter(level: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(level).map_err(|_| LoggerError::InvalidLogLevel(level.to_string()))
}

fn mk_timer() -> OffsetTime<Rfc3339> {
    // `time` only resolves the local offset while the process is single-threaded.
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

#[cfg(all(target_os = "linux", feature = "journald"))]
fn mk_journald<S>() -> Result<BoxedLayer<S>, LoggerError>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_journald::layer().map_err(LoggerError::Journald)?;
    Ok(layer.boxed())
}

#[cfg(not(all(target_os = "linux", feature = "journald")))]
fn mk_journald<S>() -> Result<BoxedLayer<S>, LoggerError>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    Err(LoggerError::JournaldNotSupported)
}
