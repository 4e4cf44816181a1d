use std::path::PathBuf;
use thiserror::Error;

/// Why a single configuration source contributed nothing.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SourceError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read JSON from '{path}': {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to read YAML from '{path}': {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("failed to read TOML from '{path}': {source}")]
    Toml {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("context from '{path}' is not a mapping (found {found})")]
    NonMapping { path: PathBuf, found: &'static str },

    #[error("compiling script '{path}' failed: {source}")]
    Compile {
        path: PathBuf,
        source: rhai::ParseError,
    },

    #[error("running script '{path}' failed: {source}")]
    Execution {
        path: PathBuf,
        source: Box<rhai::EvalAltResult>,
    },

    #[error("calling collect_context() from '{path}' failed: {source}")]
    CollectContext {
        path: PathBuf,
        source: Box<rhai::EvalAltResult>,
    },

    #[error("script '{path}' exports '{name}', which it does not define")]
    UnknownFunction { path: PathBuf, name: String },

    #[error("value '{key}' from '{path}' cannot be used as context data: {source}")]
    Conversion {
        path: PathBuf,
        key: String,
        source: Box<rhai::EvalAltResult>,
    },
}
