pub mod cli;
pub mod context;
pub mod driver;
pub mod encoding;
mod error;
pub mod render;
pub mod settings;
pub mod source;

#[cfg(test)]
mod test_support;

pub use context::{collect_context, Context, ContextCollector, ContextValue};
pub use encoding::Encoding;
pub use error::Error;
pub use render::{render_templates, RenderError, TemplateEngine, TemplateRenderer};
pub use settings::{Settings, SettingsError};
pub use source::{SourceError, SourceLoader};
