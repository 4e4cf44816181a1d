//! Configuration sources: the files a context is collected from.

mod data;
mod error;
mod registry;
mod script;

use std::path::Path;

use crate::context::Context;
use crate::encoding::Encoding;

pub use data::{DataFormat, DataSource};
pub use error::SourceError;
pub use registry::FunctionRegistry;
pub use script::{ScriptFunction, ScriptSource};

/// A configuration source format that turns one file into a partial context.
pub trait ContextSource: Send + Sync + std::fmt::Debug {
    fn load(&self, path: &Path, encoding: Encoding) -> Result<Context, SourceError>;
}

/// How a file is loaded, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Data(DataFormat),
    Script,
}

impl SourceKind {
    /// Extensions recognized when scanning a context directory.
    pub const EXTENSIONS: &'static [&'static str] = &["json", "rhai", "toml", "yaml", "yml"];

    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "json" => Some(SourceKind::Data(DataFormat::Json)),
            "yaml" | "yml" => Some(SourceKind::Data(DataFormat::Yaml)),
            "toml" => Some(SourceKind::Data(DataFormat::Toml)),
            "rhai" => Some(SourceKind::Script),
            _ => None,
        }
    }

    /// The recognized extensions as `.json, .rhai, ...` for log messages.
    pub fn expected() -> String {
        Self::EXTENSIONS
            .iter()
            .map(|ext| format!(".{ext}"))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Dispatches each file to the source for its kind.
#[derive(Debug)]
pub struct SourceLoader {
    json: DataSource,
    yaml: DataSource,
    toml: DataSource,
    script: ScriptSource,
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self {
            json: DataSource::new(DataFormat::Json),
            yaml: DataSource::new(DataFormat::Yaml),
            toml: DataSource::new(DataFormat::Toml),
            script: ScriptSource::new(),
        }
    }
}

impl SourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_for(&self, kind: SourceKind) -> &dyn ContextSource {
        match kind {
            SourceKind::Data(DataFormat::Json) => &self.json,
            SourceKind::Data(DataFormat::Yaml) => &self.yaml,
            SourceKind::Data(DataFormat::Toml) => &self.toml,
            SourceKind::Script => &self.script,
        }
    }

    /// Loads a file given explicitly by the caller.
    ///
    /// No suffix filtering happens here: a file with an unrecognized extension
    /// is read as YAML, which also accepts JSON.
    pub fn load(&self, path: &Path, encoding: Encoding) -> Result<Context, SourceError> {
        let kind = SourceKind::from_path(path).unwrap_or(SourceKind::Data(DataFormat::Yaml));
        self.load_as(kind, path, encoding)
    }

    pub fn load_as(
        &self,
        kind: SourceKind,
        path: &Path,
        encoding: Encoding,
    ) -> Result<Context, SourceError> {
        self.source_for(kind).load(path, encoding)
    }

    pub fn script(&self) -> &ScriptSource {
        &self.script
    }
}
