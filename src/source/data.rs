//! Static data sources: JSON, YAML and TOML files.

use std::path::Path;

use serde_json::Value;

use super::{ContextSource, SourceError};
use crate::context::Context;
use crate::encoding::Encoding;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Yaml,
    Toml,
}

/// A source that parses one structured data file into a context.
///
/// The top-level value must be a mapping. An empty YAML document is the one
/// exception: it contributes no keys instead of failing.
#[derive(Debug, Clone)]
pub struct DataSource {
    format: DataFormat,
}

impl DataSource {
    pub fn new(format: DataFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> DataFormat {
        self.format
    }

    fn parse(&self, path: &Path, text: &str) -> Result<Value, SourceError> {
        match self.format {
            DataFormat::Json => serde_json::from_str(text).map_err(|e| SourceError::Json {
                path: path.to_path_buf(),
                source: e,
            }),
            DataFormat::Yaml => serde_yaml::from_str(text).map_err(|e| SourceError::Yaml {
                path: path.to_path_buf(),
                source: e,
            }),
            DataFormat::Toml => {
                let table: toml::Table = toml::from_str(text).map_err(|e| SourceError::Toml {
                    path: path.to_path_buf(),
                    source: e,
                })?;
                Ok(toml_to_json(toml::Value::Table(table)))
            }
        }
    }
}

impl ContextSource for DataSource {
    fn load(&self, path: &Path, encoding: Encoding) -> Result<Context, SourceError> {
        let text = encoding
            .read_to_string(path)
            .map_err(|e| SourceError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
        if self.format == DataFormat::Yaml && text.trim().is_empty() {
            return Ok(Context::new());
        }

        match self.parse(path, &text)? {
            Value::Object(map) => Ok(map.into()),
            Value::Null if self.format == DataFormat::Yaml => Ok(Context::new()),
            other => Err(SourceError::NonMapping {
                path: path.to_path_buf(),
                found: kind_of(&other),
            }),
        }
    }
}

fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "a mapping",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextValue;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn source_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{content}").unwrap();
        file
    }

    fn load(format: DataFormat, file: &NamedTempFile) -> Result<Context, SourceError> {
        DataSource::new(format).load(file.path(), Encoding::Utf8)
    }

    #[test]
    fn test_json_keys_unchanged() {
        let file = source_file(".json", r#"{"first": 1, "second": [2, "two"], "third": {"x": null}}"#);
        let ctx = load(DataFormat::Json, &file).unwrap();

        assert_eq!(ctx.keys().collect::<Vec<_>>(), ["first", "second", "third"]);
        assert_eq!(
            ctx.to_data(),
            json!({"first": 1, "second": [2, "two"], "third": {"x": null}})
        );
    }

    #[test]
    fn test_keys_keep_file_order() {
        let file = source_file(".yaml", "zeta: 1\nalpha: 2\nmid:\n  z: 1\n  a: 2\n");
        let ctx = load(DataFormat::Yaml, &file).unwrap();
        assert_eq!(ctx.keys().collect::<Vec<_>>(), ["zeta", "alpha", "mid"]);
        let nested = ctx.get("mid").and_then(ContextValue::as_data).unwrap();
        assert_eq!(
            nested.as_object().unwrap().keys().collect::<Vec<_>>(),
            ["z", "a"]
        );

        let file = source_file(".json", r#"{"zeta": 1, "alpha": 2}"#);
        let ctx = load(DataFormat::Json, &file).unwrap();
        assert_eq!(ctx.keys().collect::<Vec<_>>(), ["zeta", "alpha"]);

        let file = source_file(".toml", "zeta = 1\nalpha = 2\n");
        let ctx = load(DataFormat::Toml, &file).unwrap();
        assert_eq!(ctx.keys().collect::<Vec<_>>(), ["zeta", "alpha"]);
    }

    #[test]
    fn test_yaml_mapping() {
        let file = source_file(".yaml", "small_number: 7\nbig_number: 1071\n");
        let ctx = load(DataFormat::Yaml, &file).unwrap();

        assert_eq!(ctx.get("small_number"), Some(&ContextValue::Data(json!(7))));
        assert_eq!(ctx.get("big_number"), Some(&ContextValue::Data(json!(1071))));
    }

    #[test]
    fn test_toml_table() {
        let file = source_file(
            ".toml",
            "name = \"db\"\nwhen = 1979-05-27T07:32:00Z\n\n[server]\nport = 8080\n",
        );
        let ctx = load(DataFormat::Toml, &file).unwrap();

        assert_eq!(
            ctx.to_data(),
            json!({"name": "db", "when": "1979-05-27T07:32:00Z", "server": {"port": 8080}})
        );
    }

    #[test]
    fn test_empty_yaml_contributes_nothing() {
        let file = source_file(".yaml", "");
        let ctx = load(DataFormat::Yaml, &file).unwrap();
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_non_mapping_yaml() {
        let file = source_file(".yaml", "- foo\n- bar\n");
        let err = load(DataFormat::Yaml, &file).unwrap_err();

        assert!(matches!(err, SourceError::NonMapping { found: "a list", .. }));
    }

    #[test]
    fn test_scalar_json() {
        let file = source_file(".json", "42");
        let err = load(DataFormat::Json, &file).unwrap_err();

        assert!(matches!(err, SourceError::NonMapping { found: "a number", .. }));
    }

    #[test]
    fn test_empty_json_is_parse_error() {
        let file = source_file(".json", "");
        let err = load(DataFormat::Json, &file).unwrap_err();
        assert!(matches!(err, SourceError::Json { .. }));
    }

    #[test]
    fn test_invalid_json_names_path() {
        let file = source_file(".json", "{\n  \"key\": \"value\",\n}\n");
        let err = load(DataFormat::Json, &file).unwrap_err();

        assert!(matches!(err, SourceError::Json { .. }));
        let message = err.to_string();
        assert!(message.starts_with("failed to read JSON from '"));
        assert!(message.contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_invalid_yaml() {
        let file = source_file(".yaml", "invalid: yaml: here\n");
        let err = load(DataFormat::Yaml, &file).unwrap_err();
        assert!(matches!(err, SourceError::Yaml { .. }));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = DataSource::new(DataFormat::Json)
            .load(Path::new("/nonexistent/path/context.json"), Encoding::Utf8)
            .unwrap_err();

        assert!(matches!(err, SourceError::Read { .. }));
    }

    #[test]
    fn test_invalid_utf8_is_read_error() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        file.write_all(b"{\"key\": \"caf\xe9\"}").unwrap();

        let err = load(DataFormat::Json, &file).unwrap_err();
        assert!(matches!(err, SourceError::Read { .. }));

        let ctx = DataSource::new(DataFormat::Json)
            .load(file.path(), Encoding::Latin1)
            .unwrap();
        assert_eq!(ctx.get("key"), Some(&ContextValue::Data(json!("café"))));
    }

    #[test]
    fn test_loading_twice_is_idempotent() {
        let file = source_file(".json", r#"{"key": "value"}"#);
        assert_eq!(
            load(DataFormat::Json, &file).unwrap(),
            load(DataFormat::Json, &file).unwrap()
        );
    }
}
