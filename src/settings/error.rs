use std::path::PathBuf;
use thiserror::Error;

/// Failure to assemble [`Settings`](super::Settings) from its sources.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    #[error("settings file '{0}' does not exist")]
    NotFound(PathBuf),

    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("settings file '{path}' is not valid TOML: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid settings: {0}")]
    Invalid(#[from] toml::de::Error),
}
