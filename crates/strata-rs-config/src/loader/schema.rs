//! Schema validation of raw documents against a typed config template.
//!
//! The template is the serialized form of a config value. Its keys are the
//! closed set of keys a document may use.

use super::LoadPhase;
use super::flatten::join_key;
use super::format::value_kind;
use crate::ConfigError;
use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize a config into the template used to validate documents.
pub(super) fn template_of<T: Serialize + ?Sized>(
    config: &T,
    phase: LoadPhase,
) -> Result<Value, ConfigError> {
    let template = serde_json::to_value(config)
        .map_err(|err| ConfigError::serialization(phase, err.to_string()))?;
    if !template.is_object() {
        return Err(ConfigError::serialization(
            phase,
            format!(
                "config schema must serialize to a mapping, found {}",
                value_kind(&template)
            ),
        ));
    }
    Ok(template)
}

/// Reject any key in `value` that the template does not declare.
///
/// Empty mappings and non-mapping values in the template are free-form: their
/// contents are left to the typed decode.
pub(super) fn ensure_known_keys(
    value: &Value,
    template: &Value,
    origin: &str,
    phase: LoadPhase,
) -> Result<(), ConfigError> {
    let (Value::Object(map), Value::Object(allowed)) = (value, template) else {
        return Ok(());
    };
    check_object(map, allowed, origin, phase, "")
}

fn check_object(
    map: &Map<String, Value>,
    allowed: &Map<String, Value>,
    origin: &str,
    phase: LoadPhase,
    path: &str,
) -> Result<(), ConfigError> {
    for (key, value) in map {
        let key_path = join_key(path, key);
        let Some(expected) = allowed.get(key) else {
            return Err(ConfigError::SchemaMismatch {
                phase,
                origin: origin.to_string(),
                key: key_path,
            });
        };
        match (value, expected) {
            (Value::Object(child), Value::Object(child_allowed)) if !child_allowed.is_empty() => {
                check_object(child, child_allowed, origin, phase, &key_path)?;
            }
            _ => {}
        }
    }
    Ok(())
}
