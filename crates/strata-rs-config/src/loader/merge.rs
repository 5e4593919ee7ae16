//! Overlay of parsed documents onto a config template.

use serde_json::Value;

/// Overlay `document` onto `base`, descending into mappings present in both.
///
/// A null leaves a non-null base slot in place (`runtime:` or `name:` with no
/// value in YAML); any other value replaces the base slot.
pub(super) fn overlay(base: &mut Value, document: &Value) {
    match (base, document) {
        (Value::Object(base_map), Value::Object(doc_map)) => {
            for (key, value) in doc_map {
                if let Some(slot) = base_map.get_mut(key) {
                    overlay(slot, value);
                } else {
                    base_map.insert(key.clone(), value.clone());
                }
            }
        }
        (slot, Value::Null) if !slot.is_null() => {}
        (slot, value) => *slot = value.clone(),
    }
}
