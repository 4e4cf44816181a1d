//! Settings for a rendering run, layered from defaults, files and the environment.

mod builder;
mod env;
mod error;

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

use crate::encoding::Encoding;
use crate::render::TemplateEngine;

pub use builder::SettingsBuilder;
pub use error::SettingsError;

/// What to collect, what to render, and how.
///
/// `context` and `templates` accept a single path or a list of paths.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Context directories or files, in merge order.
    #[serde(deserialize_with = "one_or_many")]
    pub context: Vec<PathBuf>,
    /// Template directories, rendered in order.
    #[serde(deserialize_with = "one_or_many")]
    pub templates: Vec<PathBuf>,
    pub encoding: Encoding,
    pub engine: TemplateEngine,
    /// Template file extension; the engine's own extension when unset.
    pub template_extension: Option<String>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            context: vec![PathBuf::from("/etc/cfgrender")],
            templates: vec![PathBuf::from("/etc")],
            encoding: Encoding::Utf8,
            engine: TemplateEngine::Handlebars,
            template_extension: None,
            log_level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Creates a new settings builder.
    pub fn builder() -> SettingsBuilder {
        SettingsBuilder::default()
    }

    pub fn template_extension(&self) -> &str {
        self.template_extension
            .as_deref()
            .unwrap_or_else(|| self.engine.default_extension())
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<PathBuf>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(PathBuf),
        Many(Vec<PathBuf>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(path) => vec![path],
        OneOrMany::Many(paths) => paths,
    })
}
