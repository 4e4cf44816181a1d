//! Rendering template trees against a collected context.

mod engine;
mod error;

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::context::Context;
use crate::encoding::Encoding;
use engine::HandlebarsEngine;

pub use error::RenderError;

/// The template language used to render templates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TemplateEngine {
    #[default]
    Handlebars,
}

impl TemplateEngine {
    /// File extension, without the dot, that marks a template for this engine.
    pub fn default_extension(self) -> &'static str {
        match self {
            TemplateEngine::Handlebars => "hbs",
        }
    }
}

impl fmt::Display for TemplateEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateEngine::Handlebars => f.write_str("handlebars"),
        }
    }
}

impl FromStr for TemplateEngine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "handlebars" | "hbs" => Ok(TemplateEngine::Handlebars),
            _ => Err(format!("unknown template engine '{s}'")),
        }
    }
}

/// Renders every template below a set of roots into a sibling output file.
///
/// A template is a file whose name ends with `.<extension>`; its output is
/// the same path with that suffix removed. Each template is loaded, rendered
/// and written on its own, and a failure at any step only counts against that
/// template. Output is written to a temporary file first and moved into
/// place, so a failed write never leaves a truncated file behind.
pub struct TemplateRenderer {
    engine: HandlebarsEngine,
    encoding: Encoding,
    suffix: String,
}

impl TemplateRenderer {
    pub fn new(
        context: &Context,
        engine: TemplateEngine,
        extension: &str,
        encoding: Encoding,
    ) -> Self {
        let engine = match engine {
            TemplateEngine::Handlebars => HandlebarsEngine::new(context),
        };
        Self {
            engine,
            encoding,
            suffix: format!(".{}", extension.trim_start_matches('.')),
        }
    }

    /// Where `template` is rendered to, or `None` if it is not a template.
    pub fn output_path(&self, template: &Path) -> Option<PathBuf> {
        let name = template.file_name()?.to_str()?;
        let stem = name.strip_suffix(&self.suffix)?;
        if stem.is_empty() {
            return None;
        }
        Some(template.with_file_name(stem))
    }

    /// Renders all templates below `root`, returning the number of failures.
    pub fn render_root(&mut self, root: &Path) -> usize {
        if !root.is_dir() {
            warn!(path = %root.display(), "template directory does not exist");
            return 0;
        }

        let mut failures = 0;
        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(path = %root.display(), error = %e, "failed to read template directory");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let Some(output) = self.output_path(entry.path()) else {
                continue;
            };

            match self.render_file(entry.path(), &output) {
                Ok(()) => info!(
                    template = %entry.path().display(),
                    output = %output.display(),
                    "rendered template"
                ),
                Err(e) => {
                    error!(template = %entry.path().display(), error = %e, "failed to render template");
                    failures += 1;
                }
            }
        }

        failures
    }

    /// Loads, renders and writes a single template.
    pub fn render_file(&mut self, template: &Path, output: &Path) -> Result<(), RenderError> {
        let read_error = |e: io::Error| RenderError::Read {
            path: template.to_path_buf(),
            source: e,
        };
        let permissions = fs::metadata(template).map_err(read_error)?.permissions();
        let text = self
            .encoding
            .read_to_string(template)
            .map_err(read_error)?;

        let name = template.display().to_string();
        self.engine
            .load(&name, &text)
            .map_err(|e| RenderError::Syntax {
                path: template.to_path_buf(),
                source: Box::new(e),
            })?;
        debug!(template = %name, "loaded template");
        let rendered = self.engine.render(&name);
        self.engine.unload(&name);
        let rendered = rendered.map_err(|e| RenderError::Render {
            path: template.to_path_buf(),
            source: Box::new(e),
        })?;

        let bytes = self
            .encoding
            .encode(&rendered)
            .map_err(|e| RenderError::Encode {
                path: output.to_path_buf(),
                source: e,
            })?;
        write_atomic(output, &bytes, permissions).map_err(|e| RenderError::Write {
            path: output.to_path_buf(),
            source: e,
        })
    }
}

/// Renders every template below each root in turn, returning the number of failures.
pub fn render_templates<P: AsRef<Path>>(
    roots: &[P],
    context: &Context,
    engine: TemplateEngine,
    extension: &str,
    encoding: Encoding,
) -> usize {
    let mut renderer = TemplateRenderer::new(context, engine, extension, encoding);
    roots
        .iter()
        .map(|root| renderer.render_root(root.as_ref()))
        .sum()
}

/// Writes `bytes` to `output` through a temporary file in the same directory.
///
/// The output is created with `permissions`, those of its template.
fn write_atomic(output: &Path, bytes: &[u8], permissions: fs::Permissions) -> io::Result<()> {
    let dir = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::Builder::new()
        .prefix(".cfgrender-")
        .permissions(permissions)
        .tempfile_in(dir)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(output).map_err(|e| e.error)?;
    Ok(())
}
