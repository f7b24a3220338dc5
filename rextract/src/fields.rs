//! Typed accessors over extracted JSON objects.
//!
//! ```rust
//! use rextract::{extract_object, required_string, string_list};
//!
//! let object = extract_object(r#"{"title":"Rust","tags":["lang"]}"#).expect("object");
//! assert_eq!(required_string(&object, "title").expect("title"), "Rust");
//! assert_eq!(string_list(&object, "tags"), vec!["lang".to_string()]);
//! ```

use serde_json::{Map, Value};

use crate::{ExtractError, extract_json};

/// Extracts JSON from free text and requires it to be an object.
pub fn extract_object(text: &str) -> Result<Map<String, Value>, ExtractError> {
    match extract_json(text)? {
        Value::Object(object) => Ok(object),
        other => Err(ExtractError::invalid_shape(format!(
            "expected JSON object, found {}",
            type_name(&other)
        ))),
    }
}

pub fn required_string(object: &Map<String, Value>, key: &str) -> Result<String, ExtractError> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| ExtractError::missing_field(key))
}

pub fn optional_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

/// Missing or non-boolean values read as `false`.
pub fn flag(object: &Map<String, Value>, key: &str) -> bool {
    object.get(key).and_then(Value::as_bool).unwrap_or(false)
}

pub fn optional_u64(object: &Map<String, Value>, key: &str) -> Option<u64> {
    object.get(key).and_then(Value::as_u64)
}

/// String elements of an array field; non-string elements are skipped.
pub fn string_list(object: &Map<String, Value>, key: &str) -> Vec<String> {
    object
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

pub fn value_list(object: &Map<String, Value>, key: &str) -> Vec<Value> {
    object
        .get(key)
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
