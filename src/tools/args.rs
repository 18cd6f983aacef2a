//! Argument coercion for tool calls.
//!
//! The model sends arguments as an untyped JSON object. Each tool declares
//! which fields it needs; [`parse_args`] turns every required scalar into a
//! string and then deserializes the tool's typed input struct.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::ToolError;

/// Coerces the `required` fields of `args` to strings and deserializes `T`.
///
/// Strings pass through, numbers and booleans are stringified. Missing
/// fields, `null`, arrays and objects are rejected. Fields not listed in
/// `required` are ignored.
pub fn parse_args<T: DeserializeOwned>(args: &Value, required: &[&str]) -> Result<T, ToolError> {
    let object = args.as_object().ok_or(ToolError::NotAnObject)?;

    let mut coerced = Map::new();
    for &field in required {
        let value = object
            .get(field)
            .ok_or_else(|| ToolError::MissingArgument(field.to_string()))?;
        coerced.insert(field.to_string(), Value::String(coerce(field, value)?));
    }

    serde_json::from_value(Value::Object(coerced)).map_err(|e| ToolError::Malformed(e.to_string()))
}

fn coerce(field: &str, value: &Value) -> Result<String, ToolError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Err(ToolError::MissingArgument(field.to_string())),
        Value::Array(_) | Value::Object(_) => Err(ToolError::UnsupportedType(field.to_string())),
    }
}
