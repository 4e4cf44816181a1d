//! Command line interface for the `cfgrender` binary.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::encoding::Encoding;
use crate::error::Error;
use crate::render::TemplateEngine;
use crate::settings::Settings;

/// Prefix of environment variables that override settings, e.g. `CFGRENDER__ENCODING`.
pub const ENV_PREFIX: &str = "CFGRENDER";

#[derive(Debug, Parser)]
#[command(name = "cfgrender")]
#[command(about = "Render configuration files from templates and collected context")]
#[command(version)]
pub struct Args {
    #[arg(
        short,
        long,
        value_name = "PATH",
        help = "Context directory or file (repeatable, later ones override earlier ones)"
    )]
    pub context: Vec<PathBuf>,

    #[arg(short, long, value_name = "DIR", help = "Template directory (repeatable)")]
    pub templates: Vec<PathBuf>,

    #[arg(short, long, help = "Encoding of context files, templates and output")]
    pub encoding: Option<Encoding>,

    #[arg(long, value_enum, help = "Template engine")]
    pub engine: Option<TemplateEngine>,

    #[arg(long, value_name = "EXT", help = "Extension of template files")]
    pub template_extension: Option<String>,

    #[arg(short, long, value_name = "FILE", help = "Settings file (TOML)")]
    pub settings: Option<PathBuf>,

    #[arg(long, conflicts_with = "quiet", help = "Log debug messages")]
    pub debug: bool,

    #[arg(short, long, help = "Only log warnings and errors")]
    pub quiet: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds the settings for this invocation.
    ///
    /// Defaults are overridden by the settings file, then by `CFGRENDER__*`
    /// environment variables, then by the flags given here.
    pub fn settings(&self) -> Result<Settings, Error> {
        let mut builder = Settings::builder();
        if let Some(path) = &self.settings {
            builder = builder.with_file(path, true);
        }
        let mut settings = builder.with_env(ENV_PREFIX, "__").build()?;
        self.apply(&mut settings);
        Ok(settings)
    }

    fn apply(&self, settings: &mut Settings) {
        if !self.context.is_empty() {
            settings.context = self.context.clone();
        }
        if !self.templates.is_empty() {
            settings.templates = self.templates.clone();
        }
        if let Some(encoding) = self.encoding {
            settings.encoding = encoding;
        }
        if let Some(engine) = self.engine {
            settings.engine = engine;
        }
        if let Some(extension) = &self.template_extension {
            settings.template_extension = Some(extension.clone());
        }
        if self.debug {
            settings.log_level = "debug".to_string();
        } else if self.quiet {
            settings.log_level = "warn".to_string();
        }
    }
}

/// Installs the global log subscriber; `RUST_LOG` takes precedence over `level`.
pub fn init_logging(level: &str) -> Result<(), Error> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level).map_err(|e| Error::LogLevel {
            level: level.to_string(),
            source: e,
        })?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("cfgrender").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_flags_override_settings() {
        let args = parse(&[
            "-c",
            "/srv/a",
            "--context",
            "/srv/b.json",
            "-t",
            "/srv/templates",
            "-e",
            "latin-1",
            "--template-extension",
            "tmpl",
            "--debug",
        ]);
        let mut settings = Settings::default();
        args.apply(&mut settings);

        assert_eq!(settings.context, [PathBuf::from("/srv/a"), PathBuf::from("/srv/b.json")]);
        assert_eq!(settings.templates, [PathBuf::from("/srv/templates")]);
        assert_eq!(settings.encoding, Encoding::Latin1);
        assert_eq!(settings.template_extension(), "tmpl");
        assert_eq!(settings.log_level, "debug");
    }

    #[test]
    fn test_no_flags_keep_settings() {
        let mut settings = Settings::default();
        parse(&[]).apply(&mut settings);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_quiet() {
        let mut settings = Settings::default();
        parse(&["-q"]).apply(&mut settings);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_debug_conflicts_with_quiet() {
        assert!(Args::try_parse_from(["cfgrender", "--debug", "--quiet"]).is_err());
    }

    #[test]
    fn test_invalid_encoding_rejected() {
        assert!(Args::try_parse_from(["cfgrender", "-e", "ebcdic"]).is_err());
    }

    #[test]
    fn test_missing_settings_file() {
        let args = parse(&["-s", "/nonexistent/cfgrender.toml"]);
        assert!(matches!(args.settings(), Err(Error::Settings(_))));
    }
}
