use crate::settings::SettingsError;
use thiserror::Error;

/// Top-level error type for cfgrender.
///
/// Failures of individual sources and templates are never errors at this
/// level; they are logged and counted in a [`Report`](crate::driver::Report).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("invalid log level '{level}': {source}")]
    LogLevel {
        level: String,
        source: tracing_subscriber::filter::ParseError,
    },
}
