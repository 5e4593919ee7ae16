//! Environment variable sources and override coercion.

use super::flatten::KEY_SEPARATOR;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Separator used in environment variable names.
const ENV_SEPARATOR: &str = "_";

/// Source of environment variables consulted during the override pass.
pub trait EnvSource {
    /// Value of the variable `name`, or `None` when unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads variables from the process environment.
///
/// Variables that are not valid Unicode are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: BuildHasher> EnvSource for HashMap<String, String, S> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvSource for BTreeMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<E: EnvSource + ?Sized> EnvSource for &E {
    fn var(&self, name: &str) -> Option<String> {
        (**self).var(name)
    }
}

/// Environment variable name for a dotted config key.
///
/// `runtime.environment` becomes `RUNTIME_ENVIRONMENT`, or
/// `APP_RUNTIME_ENVIRONMENT` with the prefix `app`.
pub(super) fn env_var_name(prefix: Option<&str>, key: &str) -> String {
    let key = key.replace(KEY_SEPARATOR, ENV_SEPARATOR).to_uppercase();
    match prefix.map(|prefix| prefix.trim_end_matches(ENV_SEPARATOR)) {
        Some(prefix) if !prefix.is_empty() => {
            format!("{}{ENV_SEPARATOR}{key}", prefix.to_uppercase())
        }
        _ => key,
    }
}

/// Convert a raw environment value into the shape of the value it replaces.
///
/// String leaves stay strings. Arrays are split on commas, each element
/// following the type of the existing first element (strings when empty).
/// Boolean leaves accept `1`/`t`/`true` and `0`/`f`/`false` in any of the
/// usual casings. Everything else is read as a YAML scalar, falling back to
/// the raw text so the strict decode reports the mismatch.
pub(super) fn coerce(raw: &str, current: &Value) -> Value {
    match current {
        Value::String(_) => Value::String(raw.to_string()),
        Value::Array(items) => {
            let hint = items.first().cloned().unwrap_or(Value::String(String::new()));
            if raw.trim().is_empty() {
                return Value::Array(Vec::new());
            }
            Value::Array(
                raw.split(',')
                    .map(|item| coerce(item.trim(), &hint))
                    .collect(),
            )
        }
        Value::Object(_) => match serde_yaml::from_str::<Value>(raw) {
            Ok(value @ Value::Object(_)) => value,
            _ => Value::String(raw.to_string()),
        },
        Value::Bool(_) => parse_bool(raw).map_or_else(|| parse_scalar(raw), Value::Bool),
        Value::Null | Value::Number(_) => parse_scalar(raw),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn parse_scalar(raw: &str) -> Value {
    match serde_yaml::from_str::<Value>(raw) {
        Ok(value @ (Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_))) => value,
        _ => Value::String(raw.to_string()),
    }
}
