//! Architecture summary read from a model's `config.json`.

use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use tracing::warn;

use crate::error::{CoreError, CoreResult};
use crate::verify::CONFIG_FILE;

const UNKNOWN: &str = "unknown";

/// The handful of `config.json` fields shown before a conversion.
///
/// A field holding an unexpected type reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ModelInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub model_type: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub hidden_size: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub num_hidden_layers: Option<u64>,
}

fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl ModelInfo {
    /// Read `<dir>/config.json`.
    ///
    /// Returns `Ok(None)` (and logs a warning) when the file is absent. A file
    /// that exists but does not parse is an error.
    pub fn read(dir: &Path) -> CoreResult<Option<Self>> {
        let path = dir.join(CONFIG_FILE);
        if !path.is_file() {
            warn!(path = %path.display(), "config.json not found");
            return Ok(None);
        }
        let json = std::fs::read_to_string(&path)?;
        let info = serde_json::from_str(&json).map_err(|source| CoreError::Json {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Some(info))
    }

    pub fn architecture(&self) -> String {
        display_or_unknown(self.model_type.as_deref())
    }

    pub fn hidden_size_label(&self) -> String {
        display_or_unknown(self.hidden_size)
    }

    pub fn layers_label(&self) -> String {
        display_or_unknown(self.num_hidden_layers)
    }
}

fn display_or_unknown<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| UNKNOWN.to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_architecture_fields() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"model_type":"qwen2","hidden_size":1536,"num_hidden_layers":28,"vocab_size":151936}"#,
        )
        .unwrap();
        let info = ModelInfo::read(dir.path()).unwrap().unwrap();
        assert_eq!(info.architecture(), "qwen2");
        assert_eq!(info.hidden_size_label(), "1536");
        assert_eq!(info.layers_label(), "28");
    }

    #[test]
    fn absent_config_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(ModelInfo::read(dir.path()).unwrap(), None);
    }

    #[test]
    fn missing_fields_display_unknown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), r#"{"architectures":["X"]}"#).unwrap();
        let info = ModelInfo::read(dir.path()).unwrap().unwrap();
        assert_eq!(info.architecture(), "unknown");
        assert_eq!(info.hidden_size_label(), "unknown");
        assert_eq!(info.layers_label(), "unknown");
    }

    #[test]
    fn mistyped_fields_display_unknown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.json"),
            r#"{"model_type":"qwen2","hidden_size":"1536","num_hidden_layers":null}"#,
        )
        .unwrap();
        let info = ModelInfo::read(dir.path()).unwrap().unwrap();
        assert_eq!(info.architecture(), "qwen2");
        assert_eq!(info.hidden_size, None);
        assert_eq!(info.hidden_size_label(), "unknown");
        assert_eq!(info.layers_label(), "unknown");
    }

    #[test]
    fn malformed_config_propagates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{ not json").unwrap();
        let err = ModelInfo::read(dir.path()).unwrap_err();
        assert!(matches!(err, CoreError::Json { .. }), "got {err:?}");
    }
}
