use crate::config::TelemetryConfig;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter '{value}'")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },
    #[error("subscriber already installed: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Resolves the log filter. A parseable `RUST_LOG` override wins; an
/// unparseable one falls back to the configured level, which must parse.
pub fn log_filter(configured: &str, env_override: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    if let Some(filter) = env_override.and_then(|raw| EnvFilter::try_new(raw).ok()) {
        return Ok(filter);
    }
    EnvFilter::try_new(configured).map_err(|source| TelemetryError::EnvFilter {
        value: configured.to_string(),
        source,
    })
}

/// Installs the global fmt subscriber on stderr so CLI reports on stdout
/// stay pipeable.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_override = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = log_filter(&config.log_level, env_override.as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
