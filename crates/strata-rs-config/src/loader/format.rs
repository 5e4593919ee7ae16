//! Format-agnostic document parsing into a generic `Value` tree.

use super::LoadPhase;
use crate::ConfigError;
use serde_json::{Map, Value};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Serialization formats understood by the resolver.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ConfigFormat {
    /// YAML documents (`.yaml`, `.yml`).
    #[default]
    Yaml,
    /// Plain JSON documents.
    Json,
    /// JSON5 documents (comments, unquoted keys, trailing commas).
    Json5,
}

impl ConfigFormat {
    /// Canonical lowercase name of the format.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Json5 => "json5",
        }
    }

    /// Infer the format from a file extension, if it is a known one.
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Parse `contents` into a mapping tree.
    ///
    /// A blank YAML document is an empty mapping; any other non-mapping root
    /// is rejected.
    pub(crate) fn parse(
        self,
        contents: &str,
        origin: &str,
        phase: LoadPhase,
    ) -> Result<Value, ConfigError> {
        let malformed = |message: String| ConfigError::Malformed {
            phase,
            format: self,
            origin: origin.to_string(),
            message,
        };

        let value = match self {
            Self::Yaml if contents.trim().is_empty() => Value::Null,
            Self::Yaml => serde_yaml::from_str(contents).map_err(|err| malformed(err.to_string()))?,
            Self::Json => serde_json::from_str(contents).map_err(|err| malformed(err.to_string()))?,
            Self::Json5 => json5::from_str(contents).map_err(|err| malformed(err.to_string()))?,
        };

        match value {
            Value::Object(_) => Ok(value),
            Value::Null if self == Self::Yaml => Ok(Value::Object(Map::new())),
            other => Err(malformed(format!(
                "expected a mapping at the document root, found {}",
                value_kind(&other)
            ))),
        }
    }
}

impl fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "json5" => Ok(Self::Json5),
            _ => Err(ConfigError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Human-readable name of a value's JSON type.
pub(super) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "mapping",
    }
}
