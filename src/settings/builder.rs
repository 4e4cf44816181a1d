use std::path::{Path, PathBuf};

use super::env::apply_env_vars;
use super::{Settings, SettingsError};

/// A settings source in the loading pipeline.
#[derive(Debug)]
enum SettingsSource {
    File { path: PathBuf, required: bool },
    Env { prefix: String, separator: String },
}

/// Builder for loading [`Settings`] from TOML files and environment variables.
///
/// Sources are merged in registration order on top of the defaults, later
/// sources overriding earlier ones. Nested tables are merged recursively;
/// other values (including arrays) are replaced entirely.
///
/// ## Example
///
/// ```no_run
/// use cfgrender::Settings;
///
/// let settings = Settings::builder()
///     .with_file("/etc/cfgrender.toml", false)
///     .with_env("CFGRENDER", "__")
///     .build()?;
/// # Ok::<(), cfgrender::SettingsError>(())
/// ```
#[derive(Debug, Default)]
#[must_use = "builders do nothing until .build() is called"]
pub struct SettingsBuilder {
    sources: Vec<SettingsSource>,
}

impl SettingsBuilder {
    /// Adds a TOML settings file.
    ///
    /// If `required` is `true`, the build fails if the file doesn't exist.
    /// Optional files that are missing are silently skipped.
    pub fn with_file(mut self, path: impl AsRef<Path>, required: bool) -> Self {
        self.sources.push(SettingsSource::File {
            path: path.as_ref().to_path_buf(),
            required,
        });
        self
    }

    /// Reads settings from environment variables such as `CFGRENDER__ENCODING`.
    ///
    /// The prefix and separator are stripped, remaining segments are
    /// lowercased and name the setting.
    pub fn with_env(mut self, prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        self.sources.push(SettingsSource::Env {
            prefix: prefix.into(),
            separator: separator.into(),
        });
        self
    }

    pub fn build(self) -> Result<Settings, SettingsError> {
        self.build_with_vars(std::env::vars().collect())
    }

    fn build_with_vars(self, vars: Vec<(String, String)>) -> Result<Settings, SettingsError> {
        let mut merged = toml::Table::new();

        for source in self.sources {
            match source {
                SettingsSource::File { path, required } => {
                    if let Some(table) = load_settings_file(&path, required)? {
                        deep_merge(&mut merged, table);
                    }
                }
                SettingsSource::Env { prefix, separator } => {
                    apply_env_vars(&mut merged, &prefix, &separator, vars.iter().cloned());
                }
            }
        }

        let value = toml::Value::Table(merged);
        value.try_into().map_err(SettingsError::Invalid)
    }
}

/// Loads and parses a TOML settings file.
///
/// Returns `Ok(None)` if the file doesn't exist and `required` is false.
fn load_settings_file(path: &Path, required: bool) -> Result<Option<toml::Table>, SettingsError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let table = toml::from_str(&contents).map_err(|e| SettingsError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
            Ok(Some(table))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if required {
                Err(SettingsError::NotFound(path.to_path_buf()))
            } else {
                Ok(None)
            }
        }
        Err(e) => Err(SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

fn deep_merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::Encoding;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn settings_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    fn no_vars() -> Vec<(String, String)> {
        Vec::new()
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = Settings::builder().build_with_vars(no_vars()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = settings_file(
            "context = [\"/srv/context\", \"/srv/extra.json\"]\ntemplates = \"/srv/templates\"\nencoding = \"latin-1\"\n",
        );
        let settings = Settings::builder()
            .with_file(file.path(), true)
            .build_with_vars(no_vars())
            .unwrap();

        assert_eq!(
            settings.context,
            [PathBuf::from("/srv/context"), PathBuf::from("/srv/extra.json")]
        );
        assert_eq!(settings.templates, [PathBuf::from("/srv/templates")]);
        assert_eq!(settings.encoding, Encoding::Latin1);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_env_overrides_file() {
        let file = settings_file("log_level = \"warn\"\ntemplate_extension = \"tmpl\"\n");
        let settings = Settings::builder()
            .with_file(file.path(), true)
            .with_env("CFGRENDER", "__")
            .build_with_vars(vec![
                ("CFGRENDER__LOG_LEVEL".to_string(), "debug".to_string()),
                ("CFGRENDER__TEMPLATES".to_string(), "/opt/templates".to_string()),
            ])
            .unwrap();

        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.template_extension(), "tmpl");
        assert_eq!(settings.templates, [PathBuf::from("/opt/templates")]);
    }

    #[test]
    fn test_required_file_missing() {
        let result = Settings::builder()
            .with_file("/nonexistent/cfgrender.toml", true)
            .build_with_vars(no_vars());
        assert!(matches!(result, Err(SettingsError::NotFound(_))));
    }

    #[test]
    fn test_optional_file_missing() {
        let settings = Settings::builder()
            .with_file("/nonexistent/cfgrender.toml", false)
            .build_with_vars(no_vars())
            .unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_invalid_toml() {
        let file = settings_file("encoding = \n");
        let result = Settings::builder()
            .with_file(file.path(), true)
            .build_with_vars(no_vars());
        assert!(matches!(result, Err(SettingsError::Parse { .. })));
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let file = settings_file("encoding = \"ebcdic\"\n");
        let result = Settings::builder()
            .with_file(file.path(), true)
            .build_with_vars(no_vars());
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let file = settings_file("colour = \"blue\"\n");
        let result = Settings::builder()
            .with_file(file.path(), true)
            .build_with_vars(no_vars());
        assert!(matches!(result, Err(SettingsError::Invalid(_))));
    }
}
