use std::path::PathBuf;
use thiserror::Error;

use crate::encoding::EncodingError;

/// Why a single template produced no output.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RenderError {
    #[error("failed to read template '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to load template '{path}': {source}")]
    Syntax {
        path: PathBuf,
        source: Box<handlebars::TemplateError>,
    },

    #[error("failed to render '{path}': {source}")]
    Render {
        path: PathBuf,
        source: Box<handlebars::RenderError>,
    },

    #[error("failed to encode rendered template for '{path}': {source}")]
    Encode {
        path: PathBuf,
        source: EncodingError,
    },

    #[error("failed to write rendered template to '{path}': {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}
