//! Dotted-key flattening of resolved configs and the inverse rebuild.

use super::LoadPhase;
use super::format::value_kind;
use crate::ConfigError;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Separator between path segments in flattened keys.
pub(super) const KEY_SEPARATOR: char = '.';

/// Fully-qualified view of a config: one entry per leaf, keyed by dotted path.
///
/// Empty mappings and arrays are leaves, so every key survives a rebuild.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatConfig {
    entries: BTreeMap<String, Value>,
}

impl FlatConfig {
    /// Flatten a typed config into dotted keys.
    pub fn from_config<T: Serialize + ?Sized>(config: &T) -> Result<Self, ConfigError> {
        let value = serde_json::to_value(config)
            .map_err(|err| ConfigError::serialization(LoadPhase::Flatten, err.to_string()))?;
        Self::from_value(&value)
    }

    /// Flatten a mapping tree into dotted keys.
    pub fn from_value(value: &Value) -> Result<Self, ConfigError> {
        let Value::Object(map) = value else {
            return Err(ConfigError::serialization(
                LoadPhase::Flatten,
                format!("expected a mapping at the root, found {}", value_kind(value)),
            ));
        };
        let mut entries = BTreeMap::new();
        flatten_into(map, "", &mut entries)?;
        Ok(Self { entries })
    }

    /// Value stored under a dotted key.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Dotted keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of leaf keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the config has no leaf keys.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rebuild the nested document the flat keys describe.
    pub fn to_document(&self) -> Result<Value, ConfigError> {
        let mut document = Value::Object(Map::new());
        for (key, value) in &self.entries {
            set_path(&mut document, key, value.clone())
                .map_err(|message| ConfigError::serialization(LoadPhase::Remarshal, message))?;
        }
        Ok(document)
    }
}

fn flatten_into(
    map: &Map<String, Value>,
    prefix: &str,
    entries: &mut BTreeMap<String, Value>,
) -> Result<(), ConfigError> {
    for (key, value) in map {
        if key.is_empty() || key.contains(KEY_SEPARATOR) {
            return Err(ConfigError::serialization(
                LoadPhase::Flatten,
                format!("key `{key}` under `{prefix}` cannot be used in a dotted path"),
            ));
        }
        let path = join_key(prefix, key);
        match value {
            Value::Object(child) if !child.is_empty() => flatten_into(child, &path, entries)?,
            leaf => {
                entries.insert(path, leaf.clone());
            }
        }
    }
    Ok(())
}

/// Write `value` at a dotted `key`, creating intermediate mappings.
pub(super) fn set_path(document: &mut Value, key: &str, value: Value) -> Result<(), String> {
    let mut segments = key.split(KEY_SEPARATOR).peekable();
    let mut slot = document;
    let mut walked = String::new();
    while let Some(segment) = segments.next() {
        let Value::Object(map) = slot else {
            return Err(format!("`{walked}` is a value and a parent of `{key}`"));
        };
        walked = join_key(&walked, segment);
        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return Ok(());
        }
        slot = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    Err("empty key cannot be written".to_string())
}

/// Join a parent path and a child segment with the key separator.
pub(super) fn join_key(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}{KEY_SEPARATOR}{key}")
    }
}
